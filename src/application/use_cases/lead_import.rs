use super::bulk_import::RowImporter;
use crate::domain::error::{AppError, Result};
use crate::domain::import::{RawRow, RowView};
use crate::domain::lead::{
    normalize_phone_number, DlStatus, LeadSource, LeadStatus, NewLead, PaymentPlan, PriorityLevel,
};
use crate::domain::sequence::SequenceKind;
use crate::infrastructure::config::ImportConfig;
use crate::infrastructure::db::counters::SequenceCounter;
use crate::infrastructure::db::leads::LeadRepository;
use crate::shared::dates::{month_from_name, parse_loose_date};
use async_trait::async_trait;
use chrono::NaiveDate;
use validator::ValidateEmail;

const NAME: &[&str] = &["name", "customerName", "fullName", "customer"];
const PHONE: &[&str] = &["phoneNumber", "phone", "mobile", "contactNumber"];
const EMAIL: &[&str] = &["email", "emailAddress"];
const STATUS: &[&str] = &["status", "leadStatus"];
const MONTH: &[&str] = &["month"];
const MANAGER: &[&str] = &["manager"];
const DL_STATUS: &[&str] = &["dlstatus", "driverLicense", "license"];
const SOURCE: &[&str] = &["leadSource", "source"];
const MODELS: &[&str] = &["interestedModels", "interestedModel", "models", "model"];
const MAKE: &[&str] = &["make"];
const BUDGET: &[&str] = &["budget"];
const CREDIT_SCORE: &[&str] = &["creditScore"];
const DOWN_PAYMENT: &[&str] = &["downPaymentAmount", "downPayment"];
const PAYMENT_PLAN: &[&str] = &["paymentPlan"];
const LAST_FOLLOW_UP: &[&str] = &["lastFollowUp"];
const NEXT_FOLLOW_UP: &[&str] = &["nextFollowUp"];
const TRADE_IN: &[&str] = &["tradeInOption", "tradeIn"];
const TRADE_IN_DETAILS: &[&str] = &["tradeInVehicleDetails", "tradeInDetails"];
const ASSIGNED_TO: &[&str] = &["assignedTo"];
const PRIORITY: &[&str] = &["priorityLevel", "priority"];
const COMMENTS: &[&str] = &["generalComments", "comments", "notes"];
const BUDGET_FROM: &[&str] = &["budgetFrom"];
const BUDGET_TO: &[&str] = &["budgetTo"];

/// Turns lead spreadsheet rows into insertable leads.
#[derive(Debug, Clone, Copy)]
pub struct LeadRowMapper {
    season: ImportConfig,
    today: NaiveDate,
}

impl LeadRowMapper {
    pub fn new(season: ImportConfig, today: NaiveDate) -> Self {
        Self { season, today }
    }

    pub fn map_row(&self, row: &RawRow, uploader: i64) -> Result<NewLead> {
        let view = RowView::new(row);

        let name = view
            .text(NAME)
            .ok_or_else(|| AppError::ValidationError("Missing required column: name".to_string()))?;
        let phone_number = view
            .get(PHONE)
            .map(normalize_phone_number)
            .filter(|phone| !phone.is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("Missing required column: phoneNumber".to_string())
            })?;

        let email = view.text(EMAIL);
        if let Some(email) = &email {
            if !email.validate_email() {
                return Err(AppError::ValidationError(format!("Invalid email '{}'", email)));
            }
        }

        let status =
            labelled(&view, STATUS, "status", LeadStatus::from_label)?.unwrap_or(LeadStatus::New);

        Ok(NewLead {
            category_ids: Vec::new(),
            status: Some(status),
            month: self.resolve_month(view.get(MONTH)),
            manager: view.text(MANAGER),
            dl_status: labelled(&view, DL_STATUS, "dlstatus", DlStatus::from_label)?,
            name,
            phone_number,
            email,
            lead_source: labelled(&view, SOURCE, "leadSource", LeadSource::from_label)?,
            interested_models: view.list(MODELS),
            make: view.text(MAKE),
            budget: view.number(BUDGET),
            credit_score: view.number(CREDIT_SCORE),
            down_payment_amount: view.number(DOWN_PAYMENT),
            payment_plan: labelled(&view, PAYMENT_PLAN, "paymentPlan", PaymentPlan::from_label)?,
            last_follow_up: view.get(LAST_FOLLOW_UP).and_then(parse_loose_date),
            next_follow_up: view.get(NEXT_FOLLOW_UP).and_then(parse_loose_date),
            trade_in_option: view.get(TRADE_IN).map(parse_flag).unwrap_or(false),
            trade_in_vehicle_details: view.text(TRADE_IN_DETAILS),
            assigned_to: view.text(ASSIGNED_TO),
            priority_level: labelled(&view, PRIORITY, "priorityLevel", PriorityLevel::from_label)?,
            general_comments: view.text(COMMENTS),
            budget_from: view.number(BUDGET_FROM),
            budget_to: view.number(BUDGET_TO),
            created_by: uploader,
        })
    }

    /// A full date is taken as is. A bare month name becomes the first of
    /// that month, in the season year when it falls on or after the season
    /// start month and in the following year otherwise.
    pub fn resolve_month(&self, raw: Option<&str>) -> NaiveDate {
        let Some(raw) = raw else {
            return self.today;
        };
        if let Some(date) = parse_loose_date(raw) {
            return date;
        }
        month_from_name(raw)
            .and_then(|month| {
                let year = if month >= self.season.season_start_month {
                    self.season.season_start_year
                } else {
                    self.season.season_start_year + 1
                };
                NaiveDate::from_ymd_opt(year, month, 1)
            })
            .unwrap_or(self.today)
    }
}

fn labelled<T>(
    view: &RowView<'_>,
    aliases: &[&str],
    column: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match view.get(aliases) {
        None => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::ValidationError(format!("Invalid {} '{}'", column, raw))),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

/// Stores mapped lead rows, minting an `LD` id only once a row is valid.
pub struct LeadImporter<'a> {
    pub leads: &'a LeadRepository,
    pub counter: &'a dyn SequenceCounter,
    pub mapper: LeadRowMapper,
    pub uploader: i64,
}

#[async_trait]
impl<'a> RowImporter for LeadImporter<'a> {
    fn entity(&self) -> &'static str {
        "lead"
    }

    async fn import_row(&self, row: &RawRow) -> Result<(String, String)> {
        let lead = self.mapper.map_row(row, self.uploader)?;
        let lead_id = self.counter.next_id(SequenceKind::Lead).await?;
        let now = chrono::Utc::now().timestamp_millis();
        let stored = self.leads.insert_lead(&lead_id, &lead, now).await?;
        Ok((stored.lead_id, stored.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> LeadRowMapper {
        LeadRowMapper::new(
            ImportConfig {
                season_start_year: 2024,
                season_start_month: 8,
            },
            NaiveDate::from_ymd_opt(2024, 10, 15).unwrap(),
        )
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_month_cutover() {
        let mapper = mapper();
        assert_eq!(mapper.resolve_month(Some("Feb")), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(mapper.resolve_month(Some("Aug")), NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        assert_eq!(
            mapper.resolve_month(Some("July")),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert_eq!(
            mapper.resolve_month(Some("December")),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_month_falls_back_to_today_or_date() {
        let mapper = mapper();
        let today = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        assert_eq!(mapper.resolve_month(None), today);
        assert_eq!(mapper.resolve_month(Some("someday")), today);
        assert_eq!(
            mapper.resolve_month(Some("05/03/2024")),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_map_row() {
        let lead = mapper()
            .map_row(
                &row(&[
                    ("Name", "Jordan Lee"),
                    ("Phone Number", "403-555-0199"),
                    ("Lead Source", "walk-in"),
                    ("Interested Models", "Civic, CR-V"),
                    ("Budget", "$25,000"),
                    ("Month", "Feb"),
                    ("Trade In", "Yes"),
                    ("Next Follow Up", "20-11-2024"),
                ]),
                7,
            )
            .unwrap();

        assert_eq!(lead.name, "Jordan Lee");
        assert_eq!(lead.phone_number, "4035550199");
        assert_eq!(lead.status, Some(LeadStatus::New));
        assert_eq!(lead.lead_source, Some(LeadSource::WalkIn));
        assert_eq!(lead.interested_models, vec!["Civic", "CR-V"]);
        assert_eq!(lead.budget, Some(25000.0));
        assert_eq!(lead.month, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(lead.trade_in_option);
        assert_eq!(lead.next_follow_up, NaiveDate::from_ymd_opt(2024, 11, 20));
        assert_eq!(lead.created_by, 7);
    }

    #[test]
    fn test_required_and_enum_columns() {
        let mapper = mapper();
        let missing_phone = mapper.map_row(&row(&[("name", "Sam")]), 1).unwrap_err();
        assert_eq!(missing_phone.message(), "Missing required column: phoneNumber");

        let bad_status = mapper
            .map_row(&row(&[("name", "Sam"), ("phone", "1"), ("status", "Sleepy")]), 1)
            .unwrap_err();
        assert_eq!(bad_status.message(), "Invalid status 'Sleepy'");

        let bad_email = mapper
            .map_row(&row(&[("name", "Sam"), ("phone", "1"), ("email", "nope")]), 1)
            .unwrap_err();
        assert!(matches!(bad_email, AppError::ValidationError(_)));
    }
}
