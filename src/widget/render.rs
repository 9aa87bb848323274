use super::links::{extract_markdown_links, product_handle, strip_link_markup};
use super::storefront::{ProductCard, Storefront};

/// One renderable piece of a bot reply, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySegment {
    Text(String),
    Link { title: String, url: String },
    Card(ProductCard),
}

/// Renders a raw reply into segments.
///
/// Without links the reply is a single text segment. With links, the text
/// keeps the link titles, and each link follows as either a plain
/// hyperlink or a product card. Links are enriched sequentially and each
/// falls back independently; one failure never aborts the rest.
pub async fn render_reply(storefront: &Storefront, reply: &str) -> Vec<ReplySegment> {
    let links = extract_markdown_links(reply);
    if links.is_empty() {
        return vec![ReplySegment::Text(reply.to_string())];
    }

    let mut segments = vec![ReplySegment::Text(strip_link_markup(reply))];
    for link in links {
        if product_handle(&link.url).is_none() {
            segments.push(ReplySegment::Link {
                title: link.title,
                url: link.url,
            });
            continue;
        }

        let card = storefront
            .fetch_product(&link.url)
            .await
            .unwrap_or(ProductCard {
                title: link.title,
                image: None,
                url: link.url,
            });
        segments.push(ReplySegment::Card(card));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_reply_is_one_text_segment() {
        let storefront = Storefront::new("https://shop.example.com");
        let segments = render_reply(&storefront, "Hello there!").await;
        assert_eq!(segments, vec![ReplySegment::Text("Hello there!".to_string())]);
    }

    #[tokio::test]
    async fn non_product_link_renders_as_hyperlink() {
        let storefront = Storefront::new("https://shop.example.com");
        let segments = render_reply(
            &storefront,
            "Read our [FAQ](https://shop.example.com/pages/faq).",
        )
        .await;

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], ReplySegment::Text("Read our FAQ.".to_string()));
        assert_eq!(
            segments[1],
            ReplySegment::Link {
                title: "FAQ".to_string(),
                url: "https://shop.example.com/pages/faq".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn failed_enrichment_falls_back_to_link_data() {
        // Unresolvable host, so the fetch fails and the card keeps the
        // link's own title and URL.
        let storefront = Storefront::new("http://127.0.0.1:1");
        let segments = render_reply(
            &storefront,
            "Try [Classic Belt](http://127.0.0.1:1/products/classic-belt)",
        )
        .await;

        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[1],
            ReplySegment::Card(ProductCard {
                title: "Classic Belt".to_string(),
                image: None,
                url: "http://127.0.0.1:1/products/classic-belt".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn one_failed_link_does_not_abort_the_others() {
        let storefront = Storefront::new("http://127.0.0.1:1");
        let reply = "Options: [A](http://127.0.0.1:1/products/a) and \
                     [Docs](https://shop.example.com/pages/docs)";
        let segments = render_reply(&storefront, reply).await;

        assert_eq!(segments.len(), 3);
        assert!(matches!(segments[1], ReplySegment::Card(_)));
        assert!(matches!(segments[2], ReplySegment::Link { .. }));
    }
}
