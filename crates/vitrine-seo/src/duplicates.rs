//! Duplicate-title detection and repair.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use vitrine_core::{Post, PostRepository, PostStatus, Result, UpdatePostRequest};
use vitrine_db::Database;

/// Suffixes appended to duplicate titles, in rotation.
pub const TITLE_SUFFIXES: [&str; 8] = [
    " - Guia Completo",
    " - Dicas e Estratégias",
    " - Tudo que Você Precisa Saber",
    " - Passo a Passo",
    " - Como Funciona",
    " - Benefícios e Vantagens",
    " - O Guia Definitivo",
    " - Saiba Mais",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntry {
    pub id: i64,
    pub slug: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
}

/// Posts sharing one exact title, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub title: String,
    pub posts: Vec<DuplicateEntry>,
}

/// One renamed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleFix {
    pub post_id: i64,
    pub old_title: String,
    pub new_title: String,
    pub old_slug: String,
    pub new_slug: String,
}

/// Group posts already ordered by title then creation time.
pub fn group_duplicates(posts: Vec<Post>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for post in posts {
        let entry = DuplicateEntry {
            id: post.id,
            slug: post.slug,
            status: post.status,
            created_at: post.created_at,
        };
        match groups.last_mut() {
            Some(group) if group.title == post.title => group.posts.push(entry),
            _ => groups.push(DuplicateGroup {
                title: post.title,
                posts: vec![entry],
            }),
        }
    }
    groups.retain(|g| g.posts.len() > 1);
    groups
}

/// Title for the `index`-th duplicate of a group (`index >= 1`).
pub fn renamed_title(title: &str, index: usize) -> String {
    let suffix = TITLE_SUFFIXES[index.saturating_sub(1) % TITLE_SUFFIXES.len()];
    format!("{}{}", title, suffix)
}

pub async fn find_duplicates(db: &Database) -> Result<Vec<DuplicateGroup>> {
    Ok(group_duplicates(db.posts.list_duplicate_titles().await?))
}

/// Keep the oldest post of each group and rename the others, regenerating
/// their slugs from the new titles.
pub async fn fix_duplicates(db: &Database) -> Result<Vec<TitleFix>> {
    let mut fixes = Vec::new();

    for group in find_duplicates(db).await? {
        for (index, entry) in group.posts.iter().enumerate().skip(1) {
            let new_title = renamed_title(&group.title, index);
            let updated = db
                .posts
                .update(
                    entry.id,
                    UpdatePostRequest {
                        title: Some(new_title.clone()),
                        slug: Some(new_title.clone()),
                        ..Default::default()
                    },
                )
                .await?;

            fixes.push(TitleFix {
                post_id: entry.id,
                old_title: group.title.clone(),
                new_title,
                old_slug: entry.slug.clone(),
                new_slug: updated.slug,
            });
        }
    }

    info!(
        subsystem = "seo",
        component = "duplicates",
        op = "fix_duplicates",
        result_count = fixes.len(),
        "Duplicate titles renamed"
    );
    Ok(fixes)
}
