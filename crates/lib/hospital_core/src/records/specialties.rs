//! Specialty records. Names are unique ignoring case.

use tracing::info;

use super::{RecordError, RecordKind, RecordResult, present};
use crate::models::records::{Specialty, SpecialtyFields};
use crate::store::SpecialtyStore;
use crate::uuid::new_id;

const REQUIRED: &str = "Specialty name is required";

pub async fn list<S: SpecialtyStore + ?Sized>(store: &S) -> RecordResult<Vec<Specialty>> {
    Ok(store.list_specialties().await?)
}

pub async fn get<S: SpecialtyStore + ?Sized>(store: &S, id: &str) -> RecordResult<Specialty> {
    store
        .get_specialty(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Specialty))
}

pub async fn create<S: SpecialtyStore + ?Sized>(
    store: &S,
    fields: SpecialtyFields,
) -> RecordResult<Specialty> {
    let name = present(fields.name).ok_or(RecordError::MissingFields(REQUIRED))?;
    ensure_name_free(store, &name, None).await?;

    let specialty = store
        .insert_specialty(Specialty { id: new_id(), name })
        .await?;
    info!(specialty_id = %specialty.id, "specialty created");
    Ok(specialty)
}

/// Rename a specialty. Changing only the case of its own name is allowed.
pub async fn update<S: SpecialtyStore + ?Sized>(
    store: &S,
    id: &str,
    fields: SpecialtyFields,
) -> RecordResult<Specialty> {
    let mut specialty = get(store, id).await?;
    if let Some(name) = fields.name {
        specialty.name = present(Some(name)).ok_or(RecordError::MissingFields(REQUIRED))?;
        ensure_name_free(store, &specialty.name, Some(&specialty.id)).await?;
    }

    let specialty = store
        .update_specialty(specialty)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Specialty))?;
    info!(specialty_id = %specialty.id, "specialty updated");
    Ok(specialty)
}

pub async fn delete<S: SpecialtyStore + ?Sized>(store: &S, id: &str) -> RecordResult<Specialty> {
    let specialty = store
        .delete_specialty(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Specialty))?;
    info!(specialty_id = %specialty.id, "specialty deleted");
    Ok(specialty)
}

async fn ensure_name_free<S: SpecialtyStore + ?Sized>(
    store: &S,
    name: &str,
    owner: Option<&str>,
) -> RecordResult<()> {
    match store.find_specialty_by_name(name).await? {
        Some(existing) if Some(existing.id.as_str()) != owner => {
            Err(RecordError::DuplicateSpecialty)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn named(name: &str) -> SpecialtyFields {
        SpecialtyFields {
            name: Some(name.into()),
        }
    }

    #[tokio::test]
    async fn names_collide_ignoring_case() {
        let store = MemoryStore::new();
        create(&store, named("Cardiology")).await.unwrap();
        assert!(matches!(
            create(&store, named("CARDIOLOGY")).await,
            Err(RecordError::DuplicateSpecialty)
        ));
        assert!(matches!(
            create(&store, named("  cardiology ")).await,
            Err(RecordError::DuplicateSpecialty)
        ));
    }

    #[tokio::test]
    async fn distinct_names_both_succeed() {
        let store = MemoryStore::new();
        create(&store, named("Cardiology")).await.unwrap();
        create(&store, named("Pediatrics")).await.unwrap();
        assert_eq!(list(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_name_is_missing() {
        let store = MemoryStore::new();
        for input in [SpecialtyFields::default(), named(""), named("   ")] {
            let err = create(&store, input).await.unwrap_err();
            assert_eq!(err.to_string(), "Specialty name is required");
        }
    }

    #[tokio::test]
    async fn name_is_stored_trimmed() {
        let store = MemoryStore::new();
        let created = create(&store, named("  General Medicine ")).await.unwrap();
        assert_eq!(created.name, "General Medicine");
    }

    #[tokio::test]
    async fn rename_checks_other_specialties_only() {
        let store = MemoryStore::new();
        let ophthalmology = create(&store, named("Ophthalmology")).await.unwrap();
        create(&store, named("Dermatology")).await.unwrap();

        let recased = update(&store, &ophthalmology.id, named("OPHTHALMOLOGY"))
            .await
            .unwrap();
        assert_eq!(recased.name, "OPHTHALMOLOGY");

        assert!(matches!(
            update(&store, &ophthalmology.id, named("dermatology")).await,
            Err(RecordError::DuplicateSpecialty)
        ));
    }

    #[tokio::test]
    async fn unknown_specialty_is_not_found() {
        let store = MemoryStore::new();
        let err = update(&store, "507f1f77bcf86cd799439011", named("Dermatology"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Specialty not found");
        assert!(matches!(
            delete(&store, "missing").await,
            Err(RecordError::NotFound(RecordKind::Specialty))
        ));
    }
}
