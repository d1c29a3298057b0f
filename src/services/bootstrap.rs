//! Startup seeding of the administrator account and sample catalog

use crate::{config::UsersConfig, error::AppResult, models::book::CreateBook};

use super::Services;

/// What a seeding pass added
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub books_created: usize,
}

fn sample_catalog() -> Vec<CreateBook> {
    let book = |isbn: &str, title: &str, author: &str, category: &str, description: &str, copies: i64| {
        CreateBook {
            isbn: Some(isbn.to_string()),
            title: title.to_string(),
            author: author.to_string(),
            category: Some(category.to_string()),
            description: Some(description.to_string()),
            total_copies: copies,
        }
    };

    vec![
        book("978-7-111-12345-6", "Python Crash Course", "Eric Matthes", "Programming", "A hands-on introduction to Python", 5),
        book("978-7-111-23456-3", "Flask Web Development", "Miguel Grinberg", "Web Development", "Building web applications with Flask", 3),
        book("978-7-111-34567-0", "Computer Systems: A Programmer's Perspective", "Randal E. Bryant", "Computer Science", "The classic systems textbook", 2),
        book("978-7-111-45678-7", "Introduction to Algorithms", "Thomas H. Cormen", "Algorithms", "The standard reference on algorithm design", 1),
        book("978-7-111-56789-4", "Design Patterns", "Erich Gamma", "Software Engineering", "Elements of reusable object-oriented software", 2),
    ]
}

/// Insert the administrator and sample books if they are missing.
///
/// Safe to run on every start.
pub async fn seed(services: &Services, config: &UsersConfig) -> AppResult<SeedReport> {
    let admin_created = services
        .users
        .ensure_admin(
            &config.admin_username,
            config.admin_email.as_deref(),
            &config.admin_password,
        )
        .await?;

    if admin_created {
        tracing::info!("Created administrator account '{}'", config.admin_username);
    }

    let mut books_created = 0;
    if config.seed_sample_books {
        for book in sample_catalog() {
            if services.catalog.create_if_absent(&book).await? {
                books_created += 1;
            }
        }
    }

    if books_created > 0 {
        tracing::info!("Seeded {} sample books", books_created);
    }

    Ok(SeedReport {
        admin_created,
        books_created,
    })
}
