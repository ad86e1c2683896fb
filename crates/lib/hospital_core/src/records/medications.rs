//! Medication stock records.

use tracing::info;

use super::{RecordError, RecordKind, RecordResult, apply, present};
use crate::models::records::{Medication, MedicationFields};
use crate::store::MedicationStore;
use crate::uuid::new_id;

const REQUIRED: &str =
    "Name, Description, Price, Quantity, Category and Laboratory are required";
const NEGATIVE_PRICE: &str = "Price must be a non-negative number";
const NEGATIVE_QUANTITY: &str = "Quantity must be a non-negative integer";

pub async fn list<S: MedicationStore + ?Sized>(store: &S) -> RecordResult<Vec<Medication>> {
    Ok(store.list_medications().await?)
}

pub async fn get<S: MedicationStore + ?Sized>(store: &S, id: &str) -> RecordResult<Medication> {
    store
        .get_medication(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Medication))
}

pub async fn create<S: MedicationStore + ?Sized>(
    store: &S,
    fields: MedicationFields,
) -> RecordResult<Medication> {
    let (
        Some(name),
        Some(description),
        Some(price),
        Some(quantity),
        Some(category),
        Some(laboratory),
    ) = (
        present(fields.name),
        present(fields.description),
        fields.price,
        fields.quantity,
        present(fields.category),
        present(fields.laboratory),
    )
    else {
        return Err(RecordError::MissingFields(REQUIRED));
    };

    let medication = store
        .insert_medication(Medication {
            id: new_id(),
            name,
            description,
            price: check_price(price)?,
            quantity: check_quantity(quantity)?,
            category,
            laboratory,
        })
        .await?;
    info!(medication_id = %medication.id, "medication created");
    Ok(medication)
}

pub async fn update<S: MedicationStore + ?Sized>(
    store: &S,
    id: &str,
    fields: MedicationFields,
) -> RecordResult<Medication> {
    let mut medication = get(store, id).await?;

    apply(&mut medication.name, fields.name, REQUIRED)?;
    apply(&mut medication.description, fields.description, REQUIRED)?;
    apply(&mut medication.category, fields.category, REQUIRED)?;
    apply(&mut medication.laboratory, fields.laboratory, REQUIRED)?;
    if let Some(price) = fields.price {
        medication.price = check_price(price)?;
    }
    if let Some(quantity) = fields.quantity {
        medication.quantity = check_quantity(quantity)?;
    }

    let medication = store
        .update_medication(medication)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Medication))?;
    info!(medication_id = %medication.id, "medication updated");
    Ok(medication)
}

pub async fn delete<S: MedicationStore + ?Sized>(
    store: &S,
    id: &str,
) -> RecordResult<Medication> {
    let medication = store
        .delete_medication(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Medication))?;
    info!(medication_id = %medication.id, "medication deleted");
    Ok(medication)
}

fn check_price(price: f64) -> RecordResult<f64> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(RecordError::InvalidField(NEGATIVE_PRICE))
    }
}

fn check_quantity(quantity: i64) -> RecordResult<i64> {
    if quantity >= 0 {
        Ok(quantity)
    } else {
        Err(RecordError::InvalidField(NEGATIVE_QUANTITY))
    }
}
