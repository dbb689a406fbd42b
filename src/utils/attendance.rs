use crate::database::models::{
    BotConfig, CheckInKind, CheckInRecord, NewCheckIn, is_checked_in,
};
use crate::database::store::{RecordStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};

/// Who is checking in or out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: String,
    pub display_name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    AlreadyCheckedIn { since: DateTime<Utc> },
    /// Standups are mandatory and today's is missing; the check-in waits for it.
    StandupRequired,
    Recorded(CheckInRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutOutcome {
    NotCheckedIn,
    Recorded {
        record: CheckInRecord,
        worked_minutes: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceStatus {
    pub checked_in: bool,
    pub last_change: Option<CheckInRecord>,
    pub standup_submitted: bool,
    pub date: NaiveDate,
}

pub async fn check_in(
    store: &dyn RecordStore,
    member: &Member,
    config: &BotConfig,
    today: NaiveDate,
) -> Result<CheckInOutcome, StoreError> {
    let latest = store.latest_check_in(&member.user_id).await?;
    if let Some(record) = latest.as_ref().filter(|r| r.kind == CheckInKind::CheckIn) {
        return Ok(CheckInOutcome::AlreadyCheckedIn {
            since: record.created_at,
        });
    }

    if config.standup_mandatory && !store.has_standup_on(&member.user_id, today).await? {
        tracing::info!("Check-in for {} waits for today's standup", member.user_id);
        return Ok(CheckInOutcome::StandupRequired);
    }

    let record = store
        .append_check_in(new_entry(member, CheckInKind::CheckIn))
        .await?;
    tracing::info!("Checked in {} ({})", member.display_name, member.user_id);
    Ok(CheckInOutcome::Recorded(record))
}

pub async fn check_out(
    store: &dyn RecordStore,
    member: &Member,
) -> Result<CheckOutOutcome, StoreError> {
    let latest = store.latest_check_in(&member.user_id).await?;
    let Some(checked_in) = latest.filter(|r| r.kind == CheckInKind::CheckIn) else {
        return Ok(CheckOutOutcome::NotCheckedIn);
    };

    let record = store
        .append_check_in(new_entry(member, CheckInKind::CheckOut))
        .await?;
    let worked_minutes = record
        .created_at
        .signed_duration_since(checked_in.created_at)
        .num_minutes()
        .max(0);
    tracing::info!(
        "Checked out {} ({}) after {} minutes",
        member.display_name,
        member.user_id,
        worked_minutes
    );

    Ok(CheckOutOutcome::Recorded {
        record,
        worked_minutes,
    })
}

pub async fn status(
    store: &dyn RecordStore,
    user_id: &str,
    today: NaiveDate,
) -> Result<AttendanceStatus, StoreError> {
    let last_change = store.latest_check_in(user_id).await?;
    let standup_submitted = store.has_standup_on(user_id, today).await?;

    Ok(AttendanceStatus {
        checked_in: is_checked_in(last_change.as_ref()),
        last_change,
        standup_submitted,
        date: today,
    })
}

fn new_entry(member: &Member, kind: CheckInKind) -> NewCheckIn {
    NewCheckIn {
        user_id: member.user_id.clone(),
        display_name: member.display_name.clone(),
        contact: member.contact.clone(),
        kind,
        standup_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Feeling, NewStandup};
    use crate::standup::testing::MemoryRecordStore;

    fn member() -> Member {
        Member {
            user_id: "u1".into(),
            display_name: "Alice".into(),
            contact: "<@u1>".into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[tokio::test]
    async fn check_in_then_out() {
        let store = MemoryRecordStore::new();
        let config = BotConfig::default();

        let outcome = check_in(&store, &member(), &config, today()).await.unwrap();
        assert!(matches!(outcome, CheckInOutcome::Recorded(ref r) if r.kind == CheckInKind::CheckIn));

        let again = check_in(&store, &member(), &config, today()).await.unwrap();
        assert!(matches!(again, CheckInOutcome::AlreadyCheckedIn { .. }));

        let out = check_out(&store, &member()).await.unwrap();
        assert!(matches!(out, CheckOutOutcome::Recorded { worked_minutes: 0, .. }));

        let out_again = check_out(&store, &member()).await.unwrap();
        assert_eq!(out_again, CheckOutOutcome::NotCheckedIn);
        assert_eq!(store.check_ins().len(), 2);
    }

    #[tokio::test]
    async fn never_checked_in_counts_as_checked_out() {
        let store = MemoryRecordStore::new();

        assert_eq!(check_out(&store, &member()).await.unwrap(), CheckOutOutcome::NotCheckedIn);

        let current = status(&store, "u1", today()).await.unwrap();
        assert!(!current.checked_in);
        assert!(current.last_change.is_none());
        assert!(!current.standup_submitted);
    }

    #[tokio::test]
    async fn mandatory_standup_defers_check_in() {
        let store = MemoryRecordStore::new();
        let config = BotConfig {
            standup_mandatory: true,
            ..BotConfig::default()
        };

        let outcome = check_in(&store, &member(), &config, today()).await.unwrap();
        assert_eq!(outcome, CheckInOutcome::StandupRequired);
        assert!(store.check_ins().is_empty());

        store
            .append_standup(NewStandup {
                user_id: "u1".into(),
                display_name: "Alice".into(),
                feeling: Feeling::Okay,
                yesterday: vec![],
                today: vec![],
                blockers: String::new(),
                date: today(),
            })
            .await
            .unwrap();

        let outcome = check_in(&store, &member(), &config, today()).await.unwrap();
        assert!(matches!(outcome, CheckInOutcome::Recorded(_)));

        let current = status(&store, "u1", today()).await.unwrap();
        assert!(current.checked_in);
        assert!(current.standup_submitted);
    }
}
