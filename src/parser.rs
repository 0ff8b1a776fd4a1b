use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::models::{ShopLink, TentativeLeaflet};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static SHOP_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("ul.categories li"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static LEAFLET_GRID: LazyLock<Selector> = LazyLock::new(|| selector("div.letaky-grid"));
static LEAFLET_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("div.brochure-thumb"));
static THUMBNAIL: LazyLock<Selector> = LazyLock::new(|| selector("div.img-container picture img"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("p.grid-item-content strong"));
static DATE_TEXT: LazyLock<Selector> =
    LazyLock::new(|| selector("p.grid-item-content small.hidden-sm"));

/// Parse the category listing into shop links, in document order.
/// Entries without a usable link are skipped.
pub fn parse_shop_links(html: &str, base_url: &Url) -> Vec<ShopLink> {
    let doc = Html::parse_document(html);

    doc.select(&SHOP_ITEM)
        .filter_map(|item| {
            let link = item.select(&LINK).next()?;
            let href = link.value().attr("href")?;
            match base_url.join(href) {
                Ok(url) => Some(ShopLink {
                    name: element_text(link),
                    url: url.to_string(),
                }),
                Err(err) => {
                    tracing::debug!(href, error = %err, "skipping shop link with bad href");
                    None
                }
            }
        })
        .collect()
}

/// Parse the leaflet thumbnails on a shop page. A page without a leaflet
/// grid yields no leaflets.
pub fn parse_leaflets(html: &str, shop_name: &str) -> Result<Vec<TentativeLeaflet>, ExtractError> {
    let doc = Html::parse_document(html);

    let Some(grid) = doc.select(&LEAFLET_GRID).next() else {
        tracing::debug!(shop = shop_name, "no leaflet grid on shop page");
        return Ok(Vec::new());
    };

    grid.select(&LEAFLET_BLOCK)
        .map(|block| -> Result<TentativeLeaflet, ExtractError> {
            Ok(TentativeLeaflet {
                title: required_text(block, &TITLE, "title", shop_name)?,
                thumbnail: thumbnail_url(block),
                shop_name: shop_name.to_owned(),
                date_text: required_text(block, &DATE_TEXT, "date", shop_name)?,
            })
        })
        .collect()
}

fn thumbnail_url(block: ElementRef<'_>) -> Option<String> {
    let img = block.select(&THUMBNAIL).next()?;
    ["src", "data-src"]
        .into_iter()
        .filter_map(|attr| img.value().attr(attr))
        .find(|value| !value.trim().is_empty())
        .map(str::to_owned)
}

fn required_text(
    block: ElementRef<'_>,
    sel: &Selector,
    field: &'static str,
    shop: &str,
) -> Result<String, ExtractError> {
    block
        .select(sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractError::MissingField {
            field,
            shop: shop.to_owned(),
        })
}

/// Visible text of an element with runs of whitespace collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.prospektmaschine.de").unwrap()
    }

    fn block(img: &str, title: &str, dates: &str) -> String {
        format!(
            r#"<div class="brochure-thumb">
                 <a href="/kaufland/">
                   <div class="img-container"><picture>{img}</picture></div>
                 </a>
                 <p class="grid-item-content">
                   <strong>{title}</strong>
                   <small class="hidden-sm">{dates}</small>
                   <small class="visible-sm">ignored</small>
                 </p>
               </div>"#
        )
    }

    fn shop_page(blocks: &[String]) -> String {
        format!(
            r#"<html><body><div class="letaky-grid">{}</div></body></html>"#,
            blocks.concat()
        )
    }

    #[test]
    fn shop_links_skip_items_without_links() {
        let html = r#"
            <ul class="categories">
              <li><a href="/kaufland/">Kaufland</a></li>
              <li>Nur Text</li>
              <li><a href="/lidl/"> Lidl
                 </a></li>
              <li><span>leer</span></li>
              <li><a href="https://other.example.com/real/">Real</a></li>
            </ul>
            <ul class="other"><li><a href="/nope/">Nope</a></li></ul>"#;

        let links = parse_shop_links(html, &base());
        assert_eq!(
            links,
            vec![
                ShopLink {
                    name: "Kaufland".into(),
                    url: "https://www.prospektmaschine.de/kaufland/".into()
                },
                ShopLink {
                    name: "Lidl".into(),
                    url: "https://www.prospektmaschine.de/lidl/".into()
                },
                ShopLink {
                    name: "Real".into(),
                    url: "https://other.example.com/real/".into()
                },
            ]
        );
    }

    #[test]
    fn shop_links_empty_listing() {
        assert!(parse_shop_links("<html><body></body></html>", &base()).is_empty());
    }

    #[test]
    fn missing_grid_yields_no_leaflets() {
        let html = r#"<html><body><div class="brochure-thumb"></div></body></html>"#;
        assert!(parse_leaflets(html, "Aldi").unwrap().is_empty());
    }

    #[test]
    fn leaflets_in_document_order() {
        let html = shop_page(&[
            block(r#"<img src="https://img.example.com/1.jpg">"#, "Weekly Deals", "01.01.2024 - 31.12.2024"),
            block(r#"<img data-src="https://img.example.com/2.jpg">"#, "Spar Mit", "von Freitag 05.01.2024"),
        ]);

        let leaflets = parse_leaflets(&html, "Kaufland").unwrap();
        assert_eq!(
            leaflets,
            vec![
                TentativeLeaflet {
                    title: "Weekly Deals".into(),
                    thumbnail: Some("https://img.example.com/1.jpg".into()),
                    shop_name: "Kaufland".into(),
                    date_text: "01.01.2024 - 31.12.2024".into(),
                },
                TentativeLeaflet {
                    title: "Spar Mit".into(),
                    thumbnail: Some("https://img.example.com/2.jpg".into()),
                    shop_name: "Kaufland".into(),
                    date_text: "von Freitag 05.01.2024".into(),
                },
            ]
        );
    }

    #[test]
    fn thumbnail_prefers_src_and_skips_empty_values() {
        let html = shop_page(&[
            block(r#"<img src="a.jpg" data-src="b.jpg">"#, "A", "x"),
            block(r#"<img src="" data-src="b.jpg">"#, "B", "x"),
            block(r#"<img alt="none">"#, "C", "x"),
            block("", "D", "x"),
        ]);

        let thumbs: Vec<Option<String>> = parse_leaflets(&html, "Netto")
            .unwrap()
            .into_iter()
            .map(|l| l.thumbnail)
            .collect();
        assert_eq!(thumbs, vec![Some("a.jpg".into()), Some("b.jpg".into()), None, None]);
    }

    #[test]
    fn missing_title_is_an_error() {
        let html = shop_page(&[r#"<div class="brochure-thumb">
              <p class="grid-item-content"><small class="hidden-sm">01.01.2024 - 02.01.2024</small></p>
            </div>"#
            .to_owned()]);

        let err = parse_leaflets(&html, "Penny").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingField { field: "title", ref shop } if shop == "Penny"
        ));
    }

    #[test]
    fn missing_date_is_an_error() {
        let html = shop_page(&[r#"<div class="brochure-thumb">
              <p class="grid-item-content"><strong>Angebote</strong></p>
            </div>"#
            .to_owned()]);

        let err = parse_leaflets(&html, "Penny").unwrap_err();
        assert!(matches!(err, ExtractError::MissingField { field: "date", .. }));
    }
}
