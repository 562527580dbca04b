//! Catalogue service: authors, publishers and titles
//!
//! Listing reads go through the cache; catalogue writes invalidate the
//! affected listing keys so readers never see a stale list past a write.

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        publisher::{CreatePublisher, Publisher, UpdatePublisher},
        title::{CreateTitle, TitleDetails, UpdateTitle},
    },
    repository::Repository,
    services::cache::{CacheKey, CacheService},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    cache: CacheService,
}

impl CatalogService {
    pub fn new(repository: Repository, cache: CacheService) -> Self {
        Self { repository, cache }
    }

    // ----- Titles -----

    /// List all titles, read-through cached
    pub async fn list_titles(&self) -> AppResult<Vec<TitleDetails>> {
        if let Some(cached) = self.cache.get_json(&CacheKey::Books).await {
            return Ok(cached);
        }

        let titles = self.repository.titles.list().await?;
        self.cache.put_json(&CacheKey::Books, &titles).await;
        Ok(titles)
    }

    /// Full title list plus the subset actively reserved by the viewer
    pub async fn list_books_for(
        &self,
        viewer: Option<i32>,
    ) -> AppResult<(Vec<TitleDetails>, Vec<TitleDetails>)> {
        let books = self.list_titles().await?;
        let reserved = match viewer {
            Some(user_id) => self.repository.titles.list_reserved_by(user_id).await?,
            None => Vec::new(),
        };
        Ok((books, reserved))
    }

    pub async fn get_title(&self, id: i32) -> AppResult<TitleDetails> {
        self.repository.titles.get_details(id).await
    }

    pub async fn create_title(&self, title: CreateTitle) -> AppResult<TitleDetails> {
        // Resolve referenced entities up front for a 404 instead of an FK error
        self.repository
            .publishers
            .get_by_id(title.publisher_id)
            .await?;
        for author_id in &title.author_ids {
            self.repository.authors.get_by_id(*author_id).await?;
        }

        let created = self.repository.titles.create(&title).await?;
        self.cache.invalidate(&CacheKey::Books).await;
        Ok(created)
    }

    pub async fn update_title(&self, id: i32, title: UpdateTitle) -> AppResult<TitleDetails> {
        if let Some(publisher_id) = title.publisher_id {
            self.repository.publishers.get_by_id(publisher_id).await?;
        }
        if let Some(ref author_ids) = title.author_ids {
            for author_id in author_ids {
                self.repository.authors.get_by_id(*author_id).await?;
            }
        }

        let updated = self.repository.titles.update(id, &title).await?;
        self.cache.invalidate(&CacheKey::Books).await;
        Ok(updated)
    }

    pub async fn delete_title(&self, id: i32) -> AppResult<()> {
        self.repository.titles.delete(id).await?;
        self.cache.invalidate(&CacheKey::Books).await;
        Ok(())
    }

    /// Record the stored cover image path for a title
    pub async fn set_cover(&self, id: i32, path: &str) -> AppResult<()> {
        self.repository.titles.set_cover(id, path).await?;
        self.cache.invalidate(&CacheKey::Books).await;
        Ok(())
    }

    // ----- Authors -----

    /// List all authors, read-through cached
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        if let Some(cached) = self.cache.get_json(&CacheKey::Authors).await {
            return Ok(cached);
        }

        let authors = self.repository.authors.list().await?;
        self.cache.put_json(&CacheKey::Authors, &authors).await;
        Ok(authors)
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Author with the titles attached to them
    pub async fn titles_by_author(&self, author_id: i32) -> AppResult<(Author, Vec<TitleDetails>)> {
        let author = self.repository.authors.get_by_id(author_id).await?;
        let titles = self.repository.titles.list_by_author(author_id).await?;
        Ok((author, titles))
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        let created = self.repository.authors.create(&author).await?;
        self.cache.invalidate(&CacheKey::Authors).await;
        Ok(created)
    }

    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        let updated = self.repository.authors.update(id, &author).await?;
        // Author names are embedded in the cached book list as well
        self.cache.invalidate(&CacheKey::Authors).await;
        self.cache.invalidate(&CacheKey::Books).await;
        Ok(updated)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        self.cache.invalidate(&CacheKey::Authors).await;
        self.cache.invalidate(&CacheKey::Books).await;
        Ok(())
    }

    // ----- Publishers -----

    /// List all publishers, read-through cached
    pub async fn list_publishers(&self) -> AppResult<Vec<Publisher>> {
        if let Some(cached) = self.cache.get_json(&CacheKey::Publishers).await {
            return Ok(cached);
        }

        let publishers = self.repository.publishers.list().await?;
        self.cache.put_json(&CacheKey::Publishers, &publishers).await;
        Ok(publishers)
    }

    pub async fn get_publisher(&self, id: i32) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await
    }

    pub async fn create_publisher(&self, publisher: CreatePublisher) -> AppResult<Publisher> {
        let created = self.repository.publishers.create(&publisher).await?;
        self.cache.invalidate(&CacheKey::Publishers).await;
        Ok(created)
    }

    pub async fn update_publisher(
        &self,
        id: i32,
        publisher: UpdatePublisher,
    ) -> AppResult<Publisher> {
        let updated = self.repository.publishers.update(id, &publisher).await?;
        self.cache.invalidate(&CacheKey::Publishers).await;
        Ok(updated)
    }

    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        self.repository.publishers.delete(id).await?;
        self.cache.invalidate(&CacheKey::Publishers).await;
        Ok(())
    }
}
