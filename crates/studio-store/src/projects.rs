//! Project repository.
//!
//! Every project lives in one serialized array under the `projects` key.
//! Each mutation reads the whole collection, changes it and writes it back,
//! so mutations are serialized through an internal lock.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::constants::keys;
use crate::models::{advance_from, generate_id, now, NewProject, Project, ProjectFilter, ProjectPatch};
use crate::storage::{write_json, KeyValueStore};
use crate::{Result, StoreError};

/// CRUD over the persisted project collection.
///
/// Records are handed out as owned copies; nothing outside the repository
/// holds a reference into the stored collection.
pub struct ProjectRepository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

/// The stored collection as read by [`ProjectRepository::load`].
struct Collection {
    projects: Vec<Project>,
    /// Records that did not parse, written back untouched
    unparsed: Vec<serde_json::Value>,
    /// Ids were assigned or duplicates dropped
    repaired: bool,
}

impl ProjectRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// All projects in insertion order.
    ///
    /// An unreadable collection lists as empty but is left in storage.
    pub async fn list(&self) -> Result<Vec<Project>> {
        let _guard = self.write_lock.lock().await;
        let collection = match self.load().await {
            Ok(collection) => collection,
            Err(StoreError::Serialization(e)) => {
                log::warn!("Stored project collection is unreadable: {}", e);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        if collection.repaired {
            self.persist(&collection).await?;
        }
        Ok(collection.projects)
    }

    /// Projects matching `filter`, in insertion order
    pub async fn search(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.list().await?.into_iter().find(|p| p.id == id))
    }

    /// Append a new project and persist the collection.
    ///
    /// Fails with [`StoreError::Serialization`] rather than overwrite a
    /// collection that cannot be read.
    pub async fn create(&self, data: NewProject) -> Result<Project> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load().await?;

        let project = data.into_project(now());
        if collection.projects.iter().any(|p| p.id == project.id) {
            return Err(StoreError::Conflict(project.id));
        }

        collection.projects.push(project.clone());
        self.persist(&collection).await?;

        log::info!(
            "Created project '{}' ({}, studio {})",
            project.title,
            project.id,
            project.studio
        );
        Ok(project)
    }

    /// Merge `patch` into the project with `id`.
    ///
    /// Fails with [`StoreError::NotFound`] without writing anything when the
    /// id is unknown.
    pub async fn update(&self, id: &str, patch: ProjectPatch) -> Result<Project> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load().await?;

        let project = collection
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        patch.apply(project);
        project.updated_date = advance_from(project.updated_date);
        let updated = project.clone();

        self.persist(&collection).await?;
        log::info!("Updated project {}", id);
        Ok(updated)
    }

    /// Remove the project with `id`. Unknown ids are a no-op.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.load().await?;

        let before = collection.projects.len();
        collection.projects.retain(|p| p.id != id);
        if collection.projects.len() != before {
            log::info!("Deleted project {}", id);
        }

        self.persist(&collection).await?;
        Ok(true)
    }

    /// Read and normalise the stored collection.
    ///
    /// Records without an id are given one. Records that still fail to parse
    /// are kept aside as raw JSON. A value that is not a JSON array is an
    /// error.
    async fn load(&self) -> Result<Collection> {
        let mut collection = Collection {
            projects: Vec::new(),
            unparsed: Vec::new(),
            repaired: false,
        };
        let Some(raw) = self.store.get(keys::PROJECTS).await? else {
            return Ok(collection);
        };

        let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        collection.projects.reserve(values.len());
        for mut value in values {
            if let Some(object) = value.as_object_mut() {
                let has_id = object
                    .get("id")
                    .and_then(|id| id.as_str())
                    .map_or(false, |id| !id.is_empty());
                if !has_id {
                    object.insert("id".to_string(), serde_json::Value::String(generate_id()));
                    collection.repaired = true;
                }
            }

            match serde_json::from_value::<Project>(value.clone()) {
                Ok(project) if collection.projects.iter().any(|p| p.id == project.id) => {
                    log::warn!("Dropping duplicate project id {}", project.id);
                    collection.repaired = true;
                }
                Ok(project) => collection.projects.push(project),
                Err(e) => {
                    log::warn!("Skipping malformed project record: {}", e);
                    collection.unparsed.push(value);
                }
            }
        }

        Ok(collection)
    }

    async fn persist(&self, collection: &Collection) -> Result<()> {
        let mut values = Vec::with_capacity(collection.projects.len() + collection.unparsed.len());
        for project in &collection.projects {
            values.push(serde_json::to_value(project)?);
        }
        values.extend(collection.unparsed.iter().cloned());
        write_json(self.store.as_ref(), keys::PROJECTS, &values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudioKind;
    use crate::storage::{JsonFileStore, MemoryStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn haiku() -> NewProject {
        NewProject {
            title: "Pond".to_string(),
            studio: StudioKind::Creative,
            content: "Write a haiku".to_string(),
            generated_text: "An old silent pond".to_string(),
            created_by: "demo@cerebras.studio".to_string(),
            tags: vec!["poetry".to_string()],
            ..NewProject::default()
        }
    }

    fn repository() -> (ProjectRepository, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ProjectRepository::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_then_get_by_id() {
        let (repo, _) = repository();
        let created = repo.create(haiku()).await.unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.status, "draft");
    }

    #[tokio::test]
    async fn test_create_keeps_supplied_id_and_rejects_duplicates() {
        let (repo, _) = repository();
        let data = NewProject {
            id: Some("fixed-id".to_string()),
            ..haiku()
        };
        let created = repo.create(data.clone()).await.unwrap();
        assert_eq!(created.id, "fixed-id");

        assert!(matches!(
            repo.create(data).await,
            Err(StoreError::Conflict(id)) if id == "fixed-id"
        ));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (repo, _) = repository();
        for title in ["first", "second", "third"] {
            repo.create(NewProject {
                title: title.to_string(),
                ..haiku()
            })
            .await
            .unwrap();
        }

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_merges_and_advances_timestamp() {
        let (repo, _) = repository();
        let created = repo.create(haiku()).await.unwrap();

        let updated = repo.update(&created.id, ProjectPatch::title("X")).await.unwrap();
        assert_eq!(updated.title, "X");
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.created_date, created.created_date);
        assert!(updated.updated_date > created.updated_date);

        let again = repo.update(&created.id, ProjectPatch::title("Y")).await.unwrap();
        assert!(again.updated_date > updated.updated_date);
        assert_eq!(repo.get_by_id(&created.id).await.unwrap().unwrap(), again);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let (repo, store) = repository();
        repo.create(haiku()).await.unwrap();
        let before = store.get(keys::PROJECTS).await.unwrap();

        let err = repo.update("missing", ProjectPatch::title("X")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
        assert_eq!(store.get(keys::PROJECTS).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, _) = repository();
        let keep = repo.create(haiku()).await.unwrap();
        let doomed = repo.create(haiku()).await.unwrap();

        assert!(repo.delete(&doomed.id).await.unwrap());
        assert!(repo.get_by_id(&doomed.id).await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(repo.delete("never-existed").await.unwrap());
        let remaining = repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_search() {
        let (repo, _) = repository();
        repo.create(haiku()).await.unwrap();
        repo.create(NewProject {
            title: "Quicksort".to_string(),
            studio: StudioKind::Code,
            content: "Implement quicksort".to_string(),
            ..NewProject::default()
        })
        .await
        .unwrap();

        let code = repo
            .search(&ProjectFilter {
                studio: Some(StudioKind::Code),
                ..ProjectFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].title, "Quicksort");

        let haikus = repo
            .search(&ProjectFilter {
                search: Some("HAIKU".to_string()),
                ..ProjectFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(haikus.len(), 1);
    }

    #[tokio::test]
    async fn test_tolerates_legacy_records() {
        let (repo, store) = repository();
        let legacy = json!([
            { "id": "k3j9x2m1q", "title": "Old", "studio": "text", "status": null },
            { "title": "No id yet" },
            "not an object",
            { "id": "bad-date", "created_date": "yesterday" }
        ]);
        store.set(keys::PROJECTS, &legacy.to_string()).await.unwrap();

        let projects = repo.list().await.unwrap();
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0].id, "k3j9x2m1q");
        assert_eq!(projects[0].status, "draft");
        assert_eq!(projects[2].id, "bad-date");

        // The generated id was written back, so it is stable across reads.
        let assigned = projects[1].id.clone();
        let reread = repo.list().await.unwrap();
        assert_eq!(reread[1].id, assigned);
        assert!(repo.get_by_id(&assigned).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_collection_is_never_overwritten() {
        let (repo, store) = repository();
        store.set(keys::PROJECTS, "{not json").await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());

        assert!(matches!(
            repo.create(haiku()).await,
            Err(StoreError::Serialization(_))
        ));
        assert!(matches!(
            repo.delete("anything").await,
            Err(StoreError::Serialization(_))
        ));
        assert_eq!(
            store.get(keys::PROJECTS).await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_record_with_blank_dates_survives_create() {
        let (repo, store) = repository();
        let stored = json!([
            { "id": "old1", "title": "Keep me", "created_date": null, "updated_date": "" }
        ]);
        store.set(keys::PROJECTS, &stored.to_string()).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Keep me");

        repo.create(haiku()).await.unwrap();
        let kept = repo.get_by_id("old1").await.unwrap().unwrap();
        assert_eq!(kept.title, "Keep me");
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_records_are_written_back() {
        let (repo, store) = repository();
        let stored = json!([
            { "id": "good", "title": "Fine" },
            { "id": "odd", "title": 42 }
        ]);
        store.set(keys::PROJECTS, &stored.to_string()).await.unwrap();

        repo.create(haiku()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.get(keys::PROJECTS).await.unwrap().unwrap()).unwrap();
        let records = raw.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.contains(&json!({ "id": "odd", "title": 42 })));
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_persists_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let created = {
            let repo = ProjectRepository::new(Arc::new(JsonFileStore::new(temp_dir.path())));
            repo.create(haiku()).await.unwrap()
        };

        let repo = ProjectRepository::new(Arc::new(JsonFileStore::new(temp_dir.path())));
        assert_eq!(repo.get_by_id(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_serialized() {
        let (repo, _) = repository();
        let repo = Arc::new(repo);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(NewProject {
                        title: format!("p{}", i),
                        ..NewProject::default()
                    })
                    .await
                    .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.list().await.unwrap().len(), 8);
    }
}
