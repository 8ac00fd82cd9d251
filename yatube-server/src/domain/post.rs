use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// A post together with its author and (optional) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

/// Column values written by create and edit.
///
/// On update, `image: None` keeps the stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Conjunction of predicates applied to the post collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub group_id: Option<i64>,
    pub author_id: Option<i64>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_group(group_id: i64) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: i64) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        let group_ok = match self.group_id {
            Some(id) => post.group.as_ref().is_some_and(|g| g.id == id),
            None => true,
        };
        let author_ok = self.author_id.map_or(true, |id| post.author.id == id);
        group_ok && author_ok
    }
}

impl Post {
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }
}
