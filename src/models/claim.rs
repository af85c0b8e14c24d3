use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the claims table, as selected by the single-claim lookup.
///
/// A claim may have several rows (one per reprocessing run); callers only ever
/// see the one with the greatest `inserted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub claim_status: Option<String>,
    pub inserted_at: Option<NaiveDateTime>,
    pub fraud_prediction: Option<String>,
    pub fraud_score: Option<f64>,
    pub fraud_explanation: Option<String>,
}

impl ClaimRecord {
    /// Record with a status and insertion time and no fraud annotations
    pub fn new(
        claim_id: impl Into<String>,
        claim_status: impl Into<String>,
        inserted_at: NaiveDateTime,
    ) -> Self {
        Self {
            claim_id: claim_id.into(),
            claim_status: Some(claim_status.into()),
            inserted_at: Some(inserted_at),
            fraud_prediction: None,
            fraud_score: None,
            fraud_explanation: None,
        }
    }

    /// Attach fraud-model output
    pub fn with_fraud(
        mut self,
        prediction: impl Into<String>,
        score: f64,
        explanation: impl Into<String>,
    ) -> Self {
        self.fraud_prediction = Some(prediction.into());
        self.fraud_score = Some(score);
        self.fraud_explanation = Some(explanation.into());
        self
    }
}

/// Fraud-model output nested under `ai` in the claim response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnnotations {
    pub fraud_prediction: Option<String>,
    pub fraud_score: Option<f64>,
    pub fraud_explanation: Option<String>,
}

/// Caller-facing view of a claim's most recent record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimView {
    pub claim_id: String,
    /// Status exactly as stored, not normalised
    pub status: Option<String>,
    pub inserted_at: Option<NaiveDateTime>,
    pub ai: AiAnnotations,
}

impl From<ClaimRecord> for ClaimView {
    fn from(record: ClaimRecord) -> Self {
        Self {
            claim_id: record.claim_id,
            status: record.claim_status,
            inserted_at: record.inserted_at,
            ai: AiAnnotations {
                fraud_prediction: record.fraud_prediction,
                // JSON has no representation for NaN or infinities
                fraud_score: record.fraud_score.filter(|score| score.is_finite()),
                fraud_explanation: record.fraud_explanation,
            },
        }
    }
}

/// Result of a status listing. `status` echoes the caller's raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimIdList {
    pub status: String,
    pub days: i64,
    pub limit: i64,
    pub count: usize,
    pub claim_ids: Vec<String>,
}

impl ClaimIdList {
    pub fn new(status: impl Into<String>, days: i64, limit: i64, claim_ids: Vec<String>) -> Self {
        Self {
            status: status.into(),
            days,
            limit,
            count: claim_ids.len(),
            claim_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_view_nests_fraud_fields_under_ai() {
        let record = ClaimRecord::new("C-1", "In Review", at(4)).with_fraud(
            "fraud",
            0.91,
            "mismatched provider",
        );
        let json = serde_json::to_value(ClaimView::from(record)).unwrap();

        assert_eq!(json["claim_id"], "C-1");
        assert_eq!(json["status"], "In Review");
        assert_eq!(json["inserted_at"], "2025-03-04T12:00:00");
        assert_eq!(json["ai"]["fraud_prediction"], "fraud");
        assert_eq!(json["ai"]["fraud_score"], 0.91);
        assert_eq!(json["ai"]["fraud_explanation"], "mismatched provider");
    }

    #[test]
    fn test_absent_fraud_fields_serialize_as_null() {
        let json = serde_json::to_value(ClaimView::from(ClaimRecord::new("C-2", "Approved", at(1))))
            .unwrap();
        assert!(json["ai"]["fraud_prediction"].is_null());
        assert!(json["ai"]["fraud_score"].is_null());
        assert!(json["ai"]["fraud_explanation"].is_null());
    }

    #[test]
    fn test_non_finite_score_dropped() {
        let record = ClaimRecord::new("C-3", "Denied", at(2)).with_fraud("legit", f64::NAN, "n/a");
        assert_eq!(ClaimView::from(record).ai.fraud_score, None);
    }

    #[test]
    fn test_id_list_count_matches_ids() {
        let list = ClaimIdList::new(
            "In Review",
            7,
            2,
            vec!["claim-a".to_string(), "claim-b".to_string()],
        );
        assert_eq!(list.count, 2);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["status"], "In Review");
        assert_eq!(json["claim_ids"][0], "claim-a");
    }
}
