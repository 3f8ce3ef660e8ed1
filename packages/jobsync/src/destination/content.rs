//! Pure builders for the destination rows.
//!
//! Everything here is a deterministic transform of a listing; the one
//! non-deterministic attribute (view count) is passed in by the caller so
//! tests can pin it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mediere_client::RawListing;

/// `post_type` marking rows as pipeline-managed.
pub const ENTITY_TYPE: &str = "job_listing";

/// Inclusive bounds for the randomized `_viewed_count` attribute.
pub const VIEW_COUNT_MIN: u32 = 100;
pub const VIEW_COUNT_MAX: u32 = 1500;

/// Author id stamped on every entity row (never touched on upsert conflict).
const POST_AUTHOR: i64 = 1;

/// One `{prefix}posts` row.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub id: i64,
    pub author: i64,
    /// `created_at` from the source, reused for date and modified columns.
    pub date: String,
    pub content: String,
    pub title: String,
    pub slug: String,
}

/// One `{prefix}postmeta` row.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    pub key: &'static str,
    pub value: String,
}

/// Build the entity row for a listing. Fails when the listing id is not
/// numeric (the destination primary key is an integer column).
pub fn entity_row(listing: &RawListing) -> Result<EntityRow> {
    let id: i64 = listing
        .id()
        .parse()
        .with_context(|| format!("Listing id {:?} is not numeric", listing.id()))?;

    Ok(EntityRow {
        id,
        author: POST_AUTHOR,
        date: listing.text("created_at").to_string(),
        content: post_content(listing),
        title: listing.text("job_domain_name").to_string(),
        slug: listing.id().to_string(),
    })
}

/// Format the Markdown display document for a listing.
pub fn post_content(listing: &RawListing) -> String {
    format!(
        "{description}\n\n\
         ## Job Details\n\
         **Position:** {occupation}\n\
         **Location:** {locality}\n\
         **Address:** {street} {street_number}\n\n\
         ## Requirements\n\
         **Education:** {education}\n\
         **Experience:** {experience}\n\
         **Work Type:** {work_type}\n\
         **Contract:** {contract}\n\n\
         ## Additional Information\n\
         - **Available Positions:** {open_positions}\n\
         - **Work Regime:** {work_regime}\n\
         - **Expiry Date:** {expiry}\n\
         - **EU Citizens Eligible:** {eu_citizens}",
        description = listing.text("description"),
        occupation = listing.text("occupation"),
        locality = listing.text("address_locality_name"),
        street = listing.text("address_street"),
        street_number = listing.text("address_street_number"),
        education = listing.text("education_level_name"),
        experience = listing.text("professional_experience_name"),
        work_type = listing.text("work_type_name"),
        contract = listing.text("contract_type_name"),
        open_positions = listing.text("open_positions"),
        work_regime = listing.text("work_regime_name"),
        expiry = format_display_date(listing.text("job_expiry_date")),
        eu_citizens = yes_no(listing.text("offer_available_eu_citizens")),
    )
    .trim()
    .to_string()
}

/// Reformat `YYYY-MM-DD` as `DD-MM-YYYY`; anything unparseable is kept
/// verbatim.
pub fn format_display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn yes_no(value: &str) -> &'static str {
    if value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false") {
        "No"
    } else {
        "Yes"
    }
}

/// Build the fixed set of twelve attribute rows for a listing.
pub fn attribute_rows(
    listing: &RawListing,
    view_count: u32,
    thumbnail_id: &str,
) -> Vec<AttributeRow> {
    let attr = |key: &'static str, value: String| AttributeRow { key, value };

    vec![
        attr(
            "_job_address",
            format!(
                "{} {}",
                listing.text("address_street"),
                listing.text("address_street_number")
            ),
        ),
        attr(
            "_job_qualification",
            listing.text("education_level_name").to_string(),
        ),
        attr(
            "_job_experience",
            listing.text("professional_experience_name").to_string(),
        ),
        attr("_job_salary_type", "Monthly".to_string()),
        attr("_job_max_salary", listing.render_field("maximum_salary")),
        attr("_job_salary", listing.render_field("minimum_salary")),
        attr("_job_career_level", listing.text("occupation").to_string()),
        attr("_job_urgent", "On".to_string()),
        attr("_job_gender", "Both".to_string()),
        attr("_thumbnail_id", thumbnail_id.to_string()),
        attr(
            "_job_expiry_date",
            listing.text("job_expiry_date").to_string(),
        ),
        attr("_viewed_count", view_count.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_listing() -> RawListing {
        RawListing::from_api_row(
            [
                ("id", json!(17)),
                ("description", json!("Operator CNC cu experiență.")),
                ("occupation", json!("operator CNC")),
                ("address_locality_name", json!("Cluj-Napoca")),
                ("address_street", json!("Strada Fabricii")),
                ("address_street_number", json!("12")),
                ("education_level_name", json!("Liceu")),
                ("professional_experience_name", json!("2 ani")),
                ("work_type_name", json!("Full time")),
                ("contract_type_name", json!("Nedeterminat")),
                ("open_positions", json!(3)),
                ("work_regime_name", json!("Normal")),
                ("job_expiry_date", json!("2025-03-15")),
                ("offer_available_eu_citizens", json!(1)),
                ("minimum_salary", json!("3500")),
                ("maximum_salary", json!("abc")),
                ("created_at", json!("2025-01-02 10:30:00")),
                ("job_domain_name", json!("Industrie")),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }

    #[test]
    fn entity_row_carries_id_title_and_timestamps() {
        let row = entity_row(&sample_listing()).unwrap();
        assert_eq!(row.id, 17);
        assert_eq!(row.author, 1);
        assert_eq!(row.title, "Industrie");
        assert_eq!(row.slug, "17");
        assert_eq!(row.date, "2025-01-02 10:30:00");
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let listing = RawListing::from_api_row(
            [("id".to_string(), json!("not-a-number"))].into_iter().collect(),
        );
        assert!(entity_row(&listing).is_err());
    }

    #[test]
    fn content_reformats_expiry_date_and_eu_flag() {
        let content = post_content(&sample_listing());
        assert!(content.starts_with("Operator CNC cu experiență."));
        assert!(content.contains("**Address:** Strada Fabricii 12"));
        assert!(content.contains("- **Expiry Date:** 15-03-2025"));
        assert!(content.contains("- **EU Citizens Eligible:** Yes"));
    }

    #[test]
    fn unparseable_expiry_date_is_kept_verbatim() {
        assert_eq!(format_display_date("soon"), "soon");
        assert_eq!(format_display_date(""), "");
    }

    #[test]
    fn exactly_twelve_attribute_rows() {
        let rows = attribute_rows(&sample_listing(), 250, "9769");
        assert_eq!(rows.len(), 12);

        let keys: Vec<&str> = rows.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec![
                "_job_address",
                "_job_qualification",
                "_job_experience",
                "_job_salary_type",
                "_job_max_salary",
                "_job_salary",
                "_job_career_level",
                "_job_urgent",
                "_job_gender",
                "_thumbnail_id",
                "_job_expiry_date",
                "_viewed_count",
            ]
        );
    }

    #[test]
    fn attribute_rows_are_deterministic_for_a_fixed_view_count() {
        let listing = sample_listing();
        let first = attribute_rows(&listing, 777, "9769");
        let second = attribute_rows(&listing, 777, "9769");
        assert_eq!(first, second);

        let viewed = first.iter().find(|r| r.key == "_viewed_count").unwrap();
        assert_eq!(viewed.value, "777");
    }

    #[test]
    fn salary_attributes_use_the_coerced_values() {
        let rows = attribute_rows(&sample_listing(), 100, "9769");
        let min = rows.iter().find(|r| r.key == "_job_salary").unwrap();
        let max = rows.iter().find(|r| r.key == "_job_max_salary").unwrap();
        assert_eq!(min.value, "3500");
        // "abc" coerces to 0.0 at normalization time
        assert_eq!(max.value, "0");
    }
}
