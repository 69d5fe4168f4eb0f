use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format for post dates, e.g. "October 18, 2026".
pub const POST_DATE_FORMAT: &str = "%B %d, %Y";

/// BlogPost entity - an article written by the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
    pub date: NaiveDate,
}

impl BlogPost {
    /// The creation date as shown to readers.
    pub fn display_date(&self) -> String {
        self.date.format(POST_DATE_FORMAT).to_string()
    }

    /// Replace every editable field with the submitted values.
    ///
    /// The creation date is kept.
    pub fn apply_edit(&mut self, draft: PostDraft, author_id: i32) {
        self.title = draft.title;
        self.subtitle = draft.subtitle;
        self.body = draft.body;
        self.img_url = draft.img_url;
        self.author_id = author_id;
    }
}

/// Validated post fields as submitted through the post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

/// A post that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i32,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
    pub date: NaiveDate,
}

impl NewPost {
    pub fn new(draft: PostDraft, author_id: i32, date: NaiveDate) -> Self {
        Self {
            author_id,
            title: draft.title,
            subtitle: draft.subtitle,
            body: draft.body,
            img_url: draft.img_url,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(suffix: &str) -> PostDraft {
        PostDraft {
            title: format!("Title {suffix}"),
            subtitle: format!("Subtitle {suffix}"),
            body: format!("<p>Body {suffix}</p>"),
            img_url: format!("https://img.example/{suffix}.png"),
        }
    }

    #[test]
    fn test_display_date_is_month_day_year() {
        let post = BlogPost {
            id: 1,
            author_id: 1,
            title: String::new(),
            subtitle: String::new(),
            body: String::new(),
            img_url: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
        };

        assert_eq!(post.display_date(), "March 07, 2026");
    }

    #[test]
    fn test_apply_edit_overwrites_every_field() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let new = NewPost::new(draft("a"), 1, date);
        let mut post = BlogPost {
            id: 9,
            author_id: new.author_id,
            title: new.title,
            subtitle: new.subtitle,
            body: new.body,
            img_url: new.img_url,
            date: new.date,
        };

        post.apply_edit(draft("b"), 2);

        assert_eq!(post.title, "Title b");
        assert_eq!(post.subtitle, "Subtitle b");
        assert_eq!(post.body, "<p>Body b</p>");
        assert_eq!(post.img_url, "https://img.example/b.png");
        assert_eq!(post.author_id, 2);
        assert_eq!(post.date, date);
        assert_eq!(post.id, 9);
    }
}
