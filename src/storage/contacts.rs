use chrono::Utc;

use super::query::{Direction, Insert, Select};
use super::schema::Database;
use super::types::{convert_rows, to_micros, ContactInfoRow, CONTACT_INFO};
use crate::error::ContentResult;
use crate::model::{ContactInfo, CreateContactInfoInput, Validate};

impl Database {
    pub async fn create_contact_info(
        &self,
        input: CreateContactInfoInput,
    ) -> ContentResult<ContactInfo> {
        input.validate()?;

        let insert = Insert::into_table(CONTACT_INFO)
            .value("department", input.department)
            .value("contact_type", input.contact_type.as_str())
            .value("label", input.label)
            .value("value", input.value)
            .value("is_primary", input.is_primary)
            .value("display_order", input.display_order)
            .value("created_at", to_micros(Utc::now()));

        let row: ContactInfoRow = self.insert_row(&insert).await?;
        let contact = ContactInfo::try_from(row)?;
        tracing::info!(id = contact.id, department = %contact.department, "Created contact info");
        Ok(contact)
    }

    /// All contacts, grouped by department then `display_order`.
    ///
    /// `is_primary` only breaks ties between equal `display_order` values;
    /// a primary entry with a higher order still sorts after the others.
    pub async fn get_contact_info(&self) -> ContentResult<Vec<ContactInfo>> {
        let query = Select::from_table(CONTACT_INFO)
            .order_by("department", Direction::Asc)
            .order_by("display_order", Direction::Asc)
            .order_by("is_primary", Direction::Desc)
            .order_by("id", Direction::Asc);

        let rows: Vec<ContactInfoRow> = self.select_rows(&query).await?;
        convert_rows(rows)
    }
}
