//! Display segments for committed messages.

use ialab_rs_protocol::{Message, Role};
use ialab_rs_render::{Image, Segment};

/// Segment a message for display.
///
/// Assistant replies go through the rich-content segmenter; user and system
/// text is shown verbatim. An attached image follows the text.
pub fn segment_message(message: &Message) -> Vec<Segment> {
    let text = message.content.text();
    let mut segments = match message.role {
        Role::Assistant => ialab_rs_render::segment(text),
        Role::User | Role::System => ialab_rs_render::segment_plain(text),
    };
    if let Some(data) = message.content.image_data() {
        segments.push(Segment::Image(Image {
            url: data.to_string(),
            alt_text: String::new(),
        }));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use ialab_rs_protocol::MessageContent;
    use ialab_rs_render::MediaKind;
    use pretty_assertions::assert_eq;

    fn message(role: Role, content: MessageContent) -> Message {
        Message {
            id: "m".to_string(),
            role,
            content,
            timestamp: 0,
        }
    }

    #[test]
    fn assistant_links_become_embeds() {
        let segments = segment_message(&message(
            Role::Assistant,
            "https://youtu.be/abc123".into(),
        ));
        assert!(matches!(
            segments.as_slice(),
            [Segment::MediaEmbed(embed)] if embed.kind == MediaKind::Youtube
        ));
    }

    #[test]
    fn user_text_is_not_parsed() {
        let segments = segment_message(&message(Role::User, "see https://youtu.be/abc123".into()));
        assert_eq!(segments.len(), 1);
        assert!(matches!(&segments[0], Segment::Text { value, .. } if value == "see https://youtu.be/abc123"));
    }

    #[test]
    fn attached_image_follows_text() {
        let content = MessageContent::Rich {
            text: "what is this?".to_string(),
            image_data: Some("data:image/png;base64,AAAA".to_string()),
        };
        let segments = segment_message(&message(Role::User, content));
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[1],
            Segment::Image(Image {
                url: "data:image/png;base64,AAAA".to_string(),
                alt_text: String::new(),
            })
        );
    }
}
