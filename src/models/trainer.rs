// src/models/trainer.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    models::counters::CounterEffect,
    models::membership::Membership,
};

// =========================================================================
//  ENUMS
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "gender_preference", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenderPreference {
    Male,
    Female,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "day_of_week", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Waived,
}

// =========================================================================
//  PERFIL DE TREINADOR
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sport_id: Uuid,
    pub tier_id: Uuid,
    #[schema(example = 6)]
    pub experience_years: i32,
    pub bio: Option<String>,
    #[schema(example = "4.75")]
    pub rating: Decimal,
    pub total_sessions: i32,
    pub total_earnings: Decimal,
    pub monthly_earnings: Decimal,
    pub is_verified: bool,
    pub is_available: bool,
    pub gender_preference: GenderPreference,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    PendingVerification,
    Unavailable,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatingCategory {
    Excellent,
    VeryGood,
    Good,
    Average,
    BelowAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Expert,
    Senior,
    Intermediate,
    Beginner,
}

impl TrainerProfile {
    pub fn is_active_trainer(&self) -> bool {
        self.is_verified && self.is_available
    }

    pub fn availability_status(&self) -> AvailabilityStatus {
        if !self.is_verified {
            AvailabilityStatus::PendingVerification
        } else if !self.is_available {
            AvailabilityStatus::Unavailable
        } else {
            AvailabilityStatus::Available
        }
    }

    pub fn rating_category(&self) -> RatingCategory {
        let r = self.rating;
        if r >= Decimal::new(45, 1) {
            RatingCategory::Excellent
        } else if r >= Decimal::new(40, 1) {
            RatingCategory::VeryGood
        } else if r >= Decimal::new(35, 1) {
            RatingCategory::Good
        } else if r >= Decimal::new(30, 1) {
            RatingCategory::Average
        } else {
            RatingCategory::BelowAverage
        }
    }

    pub fn experience_level(&self) -> ExperienceLevel {
        match self.experience_years {
            y if y >= 10 => ExperienceLevel::Expert,
            y if y >= 5 => ExperienceLevel::Senior,
            y if y >= 2 => ExperienceLevel::Intermediate,
            _ => ExperienceLevel::Beginner,
        }
    }

    /// Disponível no dia/horário: perfil disponível e alguma janela ativa
    /// daquele dia com start_time <= time <= end_time.
    pub fn is_available_at(&self, availabilities: &[TrainerAvailability], day: DayOfWeek, time: NaiveTime) -> bool {
        self.is_available
            && availabilities.iter().any(|a| {
                a.trainer_profile_id == self.id
                    && a.is_available
                    && a.day_of_week == day
                    && a.start_time <= time
                    && time <= a.end_time
            })
    }
}

// --- Filhos do perfil ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: Uuid,
    pub trainer_profile_id: Uuid,
    #[schema(example = "CREF")]
    pub name: String,
    pub issuing_organization: String,
    #[schema(value_type = String, format = Date)]
    pub issue_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub id: Uuid,
    pub trainer_profile_id: Uuid,
    #[schema(example = "Natação infantil")]
    pub specialty: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainerAvailability {
    pub id: Uuid,
    pub trainer_profile_id: Uuid,
    pub day_of_week: DayOfWeek,
    #[schema(value_type = String, example = "08:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "12:00:00")]
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainerLocation {
    pub id: Uuid,
    pub trainer_profile_id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainerProfileDetail {
    #[serde(flatten)]
    pub profile: TrainerProfile,
    pub is_active_trainer: bool,
    pub availability_status: AvailabilityStatus,
    pub rating_category: RatingCategory,
    pub experience_level: ExperienceLevel,
    pub certifications: Vec<Certification>,
    pub specialties: Vec<Specialty>,
    pub availabilities: Vec<TrainerAvailability>,
    pub locations: Vec<TrainerLocation>,
}

/// Sobreposição estrita: encostar (10-11 e 11-12) não conflita.
pub fn slots_overlap(start: NaiveTime, end: NaiveTime, other_start: NaiveTime, other_end: NaiveTime) -> bool {
    start < other_end && end > other_start
}

/// Nova janela de disponibilidade: fim depois do início e sem conflito
/// com as janelas existentes do mesmo dia.
pub fn validate_availability(
    existing: &[TrainerAvailability],
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::field("end_time", "invalid_time_window"));
    }
    let conflict = existing
        .iter()
        .filter(|a| a.day_of_week == day)
        .any(|a| slots_overlap(start, end, a.start_time, a.end_time));
    if conflict {
        return Err(AppError::field("start_time", "availability_overlap"));
    }
    Ok(())
}

// =========================================================================
//  SESSÕES
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSession {
    pub id: Uuid,
    pub trainer_profile_id: Uuid,
    pub trainee_membership_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub session_date: NaiveDate,
    #[schema(value_type = String, example = "10:00:00")]
    pub session_time: NaiveTime,
    #[schema(example = 60)]
    pub duration_minutes: i32,
    #[schema(value_type = String, example = "11:00:00")]
    pub end_time: NaiveTime,
    pub status: SessionStatus,
    #[schema(example = "200.00")]
    pub fee_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub trainee_rating: Option<i16>,
    pub feedback: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sessão candidata (antes de ir para o banco).
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub trainer_profile_id: Uuid,
    pub trainee_membership_id: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: SessionStatus,
    pub fee_amount: Decimal,
    pub trainee_rating: Option<i16>,
    pub notes: Option<String>,
}

impl SessionDraft {
    pub fn end_time(&self) -> Result<NaiveTime, AppError> {
        session_end_time(self.session_time, self.duration_minutes)
            .ok_or_else(|| AppError::field("duration_minutes", "session_crosses_midnight"))
    }
}

/// Sessão mais longa aceita (8h).
pub const MAX_SESSION_MINUTES: i32 = 480;

/// Fim da sessão no mesmo dia. `None` quando passaria da meia-noite.
pub fn session_end_time(start: NaiveTime, duration_minutes: i32) -> Option<NaiveTime> {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
    (wrapped == 0 && end > start).then_some(end)
}

/// Regras que rodam antes de qualquer gravação de sessão.
/// Tudo é acumulado e devolvido de uma vez; nada é corrigido em silêncio.
pub fn validate_session(
    trainer: &TrainerProfile,
    trainee_membership: &Membership,
    session_date: NaiveDate,
    session_time: NaiveTime,
    status: SessionStatus,
    duration_minutes: i32,
    fee_amount: Decimal,
    trainee_rating: Option<i16>,
    today: NaiveDate,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(
        trainer.sport_id == trainee_membership.sport_id,
        "trainee_membership_id",
        "sport_mismatch",
    );
    if status == SessionStatus::Scheduled {
        errors.check(session_date >= today, "session_date", "past_session_date");
    }
    if duration_minutes <= 0 || duration_minutes > MAX_SESSION_MINUTES {
        errors.add("duration_minutes", "invalid_duration");
    } else {
        errors.check(
            session_end_time(session_time, duration_minutes).is_some(),
            "duration_minutes",
            "session_crosses_midnight",
        );
    }
    errors.check(fee_amount >= Decimal::ZERO, "fee_amount", "invalid_fee");
    if let Some(rating) = trainee_rating {
        errors.check((1..=5).contains(&rating), "trainee_rating", "invalid_rating");
    }
    errors.into_result()
}

pub fn validate_draft(
    draft: &SessionDraft,
    trainer: &TrainerProfile,
    trainee_membership: &Membership,
    today: NaiveDate,
) -> Result<(), AppError> {
    validate_session(
        trainer,
        trainee_membership,
        draft.session_date,
        draft.session_time,
        draft.status,
        draft.duration_minutes,
        draft.fee_amount,
        draft.trainee_rating,
        today,
    )
}

impl TrainerSession {
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.session_date.and_time(self.session_time).and_utc()
    }

    /// Agendada e com data de hoje ou passada.
    pub fn can_be_completed(&self, today: NaiveDate) -> bool {
        self.status == SessionStatus::Scheduled && self.session_date <= today
    }

    /// Agendada e ainda não começou.
    pub fn can_be_cancelled(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Scheduled && self.starts_at() > now
    }

    /// Uma única avaliação, só depois de concluída.
    pub fn can_be_rated(&self) -> bool {
        self.status == SessionStatus::Completed && self.trainee_rating.is_none()
    }

    /// Efeitos de contador ao concluir: gasto do aluno, ganho do treinador
    /// e, se o treinador tiver matrícula ativa no esporte, ganho nela também.
    pub fn completion_effects(&self, trainer_membership_id: Option<Uuid>) -> Result<Vec<CounterEffect>, AppError> {
        let mut effects = vec![
            CounterEffect::spending(self.trainee_membership_id, self.fee_amount)?,
            CounterEffect::trainer_earnings(self.trainer_profile_id, self.fee_amount)?,
        ];
        if let Some(membership_id) = trainer_membership_id {
            effects.push(CounterEffect::membership_earnings(membership_id, self.fee_amount)?);
        }
        Ok(effects)
    }
}

/// Resultado de updateStatistics: sessões concluídas e média das notas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerStatistics {
    pub total_sessions: i32,
    pub rating: Decimal,
}

impl TrainerStatistics {
    pub fn from_sessions(sessions: &[TrainerSession]) -> Self {
        let completed: Vec<&TrainerSession> =
            sessions.iter().filter(|s| s.status == SessionStatus::Completed).collect();

        let ratings: Vec<i16> = completed.iter().filter_map(|s| s.trainee_rating).collect();
        let rating = if ratings.is_empty() {
            Decimal::ZERO
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
            (Decimal::from(sum) / Decimal::from(ratings.len() as i64)).round_dp(2)
        };

        Self { total_sessions: completed.len() as i32, rating }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::membership::tests::{membership_from, tier_for};
    use crate::models::membership::new_membership;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn profile(sport_id: Uuid) -> TrainerProfile {
        let now = Utc::now();
        TrainerProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            sport_id,
            tier_id: Uuid::new_v4(),
            experience_years: 3,
            bio: None,
            rating: Decimal::ZERO,
            total_sessions: 0,
            total_earnings: Decimal::ZERO,
            monthly_earnings: Decimal::ZERO,
            is_verified: true,
            is_available: true,
            gender_preference: GenderPreference::Both,
            created_at: now,
            updated_at: now,
        }
    }

    fn availability(profile_id: Uuid, day: DayOfWeek, start: NaiveTime, end: NaiveTime) -> TrainerAvailability {
        TrainerAvailability {
            id: Uuid::new_v4(),
            trainer_profile_id: profile_id,
            day_of_week: day,
            start_time: start,
            end_time: end,
            is_available: true,
            created_at: Utc::now(),
        }
    }

    fn session(status: SessionStatus, date: NaiveDate, rating: Option<i16>) -> TrainerSession {
        let now = Utc::now();
        TrainerSession {
            id: Uuid::new_v4(),
            trainer_profile_id: Uuid::new_v4(),
            trainee_membership_id: Uuid::new_v4(),
            session_date: date,
            session_time: t(10, 0),
            duration_minutes: 60,
            end_time: t(11, 0),
            status,
            fee_amount: Decimal::new(200, 0),
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            trainee_rating: rating,
            feedback: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn overlap_is_strict() {
        assert!(slots_overlap(t(10, 0), t(11, 0), t(10, 30), t(11, 30)));
        assert!(!slots_overlap(t(10, 0), t(11, 0), t(11, 0), t(12, 0)));
        assert!(slots_overlap(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn availability_conflicts_only_on_same_day() {
        let id = Uuid::new_v4();
        let existing = vec![availability(id, DayOfWeek::Monday, t(10, 0), t(11, 0))];

        let overlap = validate_availability(&existing, DayOfWeek::Monday, t(10, 30), t(11, 30));
        assert!(matches!(overlap, Err(AppError::FieldValidation(ref m)) if m["start_time"] == "availability_overlap"));

        assert!(validate_availability(&existing, DayOfWeek::Monday, t(11, 0), t(12, 0)).is_ok());
        assert!(validate_availability(&existing, DayOfWeek::Tuesday, t(10, 30), t(11, 30)).is_ok());
        assert!(validate_availability(&existing, DayOfWeek::Monday, t(12, 0), t(12, 0)).is_err());
    }

    #[test]
    fn available_at_needs_profile_flag_and_matching_window() {
        let mut p = profile(Uuid::new_v4());
        let windows = vec![availability(p.id, DayOfWeek::Wednesday, t(8, 0), t(12, 0))];

        assert!(p.is_available_at(&windows, DayOfWeek::Wednesday, t(8, 0)));
        assert!(p.is_available_at(&windows, DayOfWeek::Wednesday, t(12, 0)));
        assert!(!p.is_available_at(&windows, DayOfWeek::Wednesday, t(12, 1)));
        assert!(!p.is_available_at(&windows, DayOfWeek::Thursday, t(9, 0)));

        p.is_available = false;
        assert!(!p.is_available_at(&windows, DayOfWeek::Wednesday, t(9, 0)));
    }

    #[test]
    fn derived_categories() {
        let mut p = profile(Uuid::new_v4());
        p.rating = Decimal::new(45, 1);
        assert_eq!(p.rating_category(), RatingCategory::Excellent);
        p.rating = Decimal::new(449, 2);
        assert_eq!(p.rating_category(), RatingCategory::VeryGood);
        p.rating = Decimal::new(35, 1);
        assert_eq!(p.rating_category(), RatingCategory::Good);
        p.rating = Decimal::new(3, 0);
        assert_eq!(p.rating_category(), RatingCategory::Average);
        p.rating = Decimal::new(29, 1);
        assert_eq!(p.rating_category(), RatingCategory::BelowAverage);

        p.experience_years = 10;
        assert_eq!(p.experience_level(), ExperienceLevel::Expert);
        p.experience_years = 5;
        assert_eq!(p.experience_level(), ExperienceLevel::Senior);
        p.experience_years = 2;
        assert_eq!(p.experience_level(), ExperienceLevel::Intermediate);
        p.experience_years = 1;
        assert_eq!(p.experience_level(), ExperienceLevel::Beginner);

        p.is_verified = false;
        assert_eq!(p.availability_status(), AvailabilityStatus::PendingVerification);
        assert!(!p.is_active_trainer());
        p.is_verified = true;
        p.is_available = false;
        assert_eq!(p.availability_status(), AvailabilityStatus::Unavailable);
        p.is_available = true;
        assert_eq!(p.availability_status(), AvailabilityStatus::Available);
        assert!(p.is_active_trainer());
    }

    #[test]
    fn session_across_sports_is_rejected() {
        let now = Utc::now();
        let today = now.date_naive();
        let trainer = profile(Uuid::new_v4());
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let membership = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());

        let result = validate_session(
            &trainer, &membership, today, t(10, 0), SessionStatus::Scheduled, 60, Decimal::new(200, 0), None, today,
        );
        assert!(matches!(result, Err(AppError::FieldValidation(ref m)) if m["trainee_membership_id"] == "sport_mismatch"));
    }

    #[test]
    fn session_field_rules() {
        let now = Utc::now();
        let today = now.date_naive();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let membership = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());
        let trainer = profile(membership.sport_id);
        let yesterday = today - Duration::days(1);

        let past = validate_session(&trainer, &membership, yesterday, t(10, 0), SessionStatus::Scheduled, 60, Decimal::ZERO, None, today);
        assert!(matches!(past, Err(AppError::FieldValidation(ref m)) if m["session_date"] == "past_session_date"));

        // Data passada só é barrada para sessões agendadas
        assert!(validate_session(&trainer, &membership, yesterday, t(10, 0), SessionStatus::Completed, 60, Decimal::ZERO, Some(5), today).is_ok());

        let bad = validate_session(&trainer, &membership, today, t(10, 0), SessionStatus::Scheduled, 0, Decimal::new(-1, 0), Some(6), today);
        match bad {
            Err(AppError::FieldValidation(m)) => {
                assert_eq!(m["duration_minutes"], "invalid_duration");
                assert_eq!(m["fee_amount"], "invalid_fee");
                assert_eq!(m["trainee_rating"], "invalid_rating");
            }
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
    }

    #[test]
    fn can_be_completed_only_when_scheduled_and_not_in_future() {
        let today = d(2026, 5, 10);
        assert!(session(SessionStatus::Scheduled, today, None).can_be_completed(today));
        assert!(session(SessionStatus::Scheduled, d(2026, 5, 9), None).can_be_completed(today));
        assert!(!session(SessionStatus::Scheduled, d(2026, 5, 11), None).can_be_completed(today));
        assert!(!session(SessionStatus::Cancelled, today, None).can_be_completed(today));
        assert!(!session(SessionStatus::Completed, today, None).can_be_completed(today));
    }

    #[test]
    fn can_be_cancelled_only_before_start() {
        let s = session(SessionStatus::Scheduled, d(2026, 5, 10), None);
        let before = d(2026, 5, 10).and_time(t(9, 59)).and_utc();
        let after = d(2026, 5, 10).and_time(t(10, 0)).and_utc();
        assert!(s.can_be_cancelled(before));
        assert!(!s.can_be_cancelled(after));
        assert!(!session(SessionStatus::Completed, d(2026, 5, 10), None).can_be_cancelled(before));
    }

    #[test]
    fn rating_allowed_once_on_completed_sessions() {
        let mut s = session(SessionStatus::Completed, d(2026, 5, 10), None);
        assert!(s.can_be_rated());
        s.trainee_rating = Some(5);
        assert!(!s.can_be_rated());
        assert!(!session(SessionStatus::Scheduled, d(2026, 5, 10), None).can_be_rated());
    }

    #[test]
    fn statistics_count_completed_and_average_ratings() {
        let day = d(2026, 5, 10);
        let sessions = vec![
            session(SessionStatus::Completed, day, Some(5)),
            session(SessionStatus::Completed, day, Some(4)),
            session(SessionStatus::Completed, day, Some(4)),
            session(SessionStatus::Completed, day, None),
            session(SessionStatus::Cancelled, day, None),
            session(SessionStatus::Scheduled, day, None),
        ];
        let stats = TrainerStatistics::from_sessions(&sessions);
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.rating, Decimal::new(433, 2));

        let empty = TrainerStatistics::from_sessions(&[]);
        assert_eq!(empty, TrainerStatistics { total_sessions: 0, rating: Decimal::ZERO });
    }

    #[test]
    fn completion_effects_cover_trainee_trainer_and_trainer_membership() {
        let s = session(SessionStatus::Scheduled, d(2026, 5, 10), None);
        let own = Uuid::new_v4();
        let effects = s.completion_effects(Some(own)).unwrap();
        assert_eq!(effects.len(), 3);
        assert!(effects.contains(&CounterEffect::MembershipSpend {
            membership_id: s.trainee_membership_id,
            amount: Decimal::new(200, 0)
        }));
        assert!(effects.contains(&CounterEffect::TrainerEarnings {
            trainer_profile_id: s.trainer_profile_id,
            amount: Decimal::new(200, 0)
        }));
        assert!(effects.contains(&CounterEffect::MembershipEarnings { membership_id: own, amount: Decimal::new(200, 0) }));

        assert_eq!(s.completion_effects(None).unwrap().len(), 2);
    }

    #[test]
    fn end_time_adds_duration() {
        assert_eq!(session_end_time(t(10, 0), 90), Some(t(11, 30)));
        assert_eq!(session_end_time(t(22, 0), 120), None);
    }

    #[test]
    fn session_must_end_on_the_same_day_and_within_the_cap() {
        let now = Utc::now();
        let today = now.date_naive();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let membership = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());
        let trainer = profile(membership.sport_id);

        let late = validate_session(&trainer, &membership, today, t(23, 30), SessionStatus::Scheduled, 60, Decimal::ZERO, None, today);
        assert!(matches!(late, Err(AppError::FieldValidation(ref m)) if m["duration_minutes"] == "session_crosses_midnight"));

        let long = validate_session(
            &trainer, &membership, today, t(6, 0), SessionStatus::Scheduled, MAX_SESSION_MINUTES + 1, Decimal::ZERO, None, today,
        );
        assert!(matches!(long, Err(AppError::FieldValidation(ref m)) if m["duration_minutes"] == "invalid_duration"));

        assert!(validate_session(&trainer, &membership, today, t(22, 0), SessionStatus::Scheduled, 90, Decimal::ZERO, None, today).is_ok());
    }
}
