// src/db/trainer_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::trainer::{
        Certification, DayOfWeek, GenderPreference, PaymentStatus, SessionDraft, SessionStatus, Specialty,
        TrainerAvailability, TrainerLocation, TrainerProfile, TrainerSession, TrainerStatistics,
    },
};

#[derive(Debug, Clone)]
pub struct NewTrainerProfile<'a> {
    pub user_id: Uuid,
    pub sport_id: Uuid,
    pub tier_id: Uuid,
    pub experience_years: i32,
    pub bio: Option<&'a str>,
    pub gender_preference: GenderPreference,
}

#[derive(Debug, Clone)]
pub struct NewLocation<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
}

#[derive(Clone, Default)]
pub struct TrainerRepository;

impl TrainerRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  PERFIL
    // =========================================================================

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        profile: &NewTrainerProfile<'_>,
    ) -> Result<TrainerProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerProfile>(
            r#"
            INSERT INTO trainer_profiles (user_id, sport_id, tier_id, experience_years, bio, gender_preference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(profile.user_id)
        .bind(profile.sport_id)
        .bind(profile.tier_id)
        .bind(profile.experience_years)
        .bind(profile.bio)
        .bind(profile.gender_preference)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, &[("trainer_profiles_user_id_key", "trainer_profile_exists")]))
    }

    pub async fn find_profile<'e, E>(&self, executor: E, profile_id: Uuid) -> Result<Option<TrainerProfile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, TrainerProfile>("SELECT * FROM trainer_profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_optional(executor)
            .await?;
        Ok(profile)
    }

    pub async fn find_profile_for_update<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Option<TrainerProfile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, TrainerProfile>("SELECT * FROM trainer_profiles WHERE id = $1 FOR UPDATE")
            .bind(profile_id)
            .fetch_optional(executor)
            .await?;
        Ok(profile)
    }

    pub async fn find_profile_by_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<TrainerProfile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, TrainerProfile>("SELECT * FROM trainer_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(profile)
    }

    pub async fn list_profiles<'e, E>(
        &self,
        executor: E,
        sport_id: Option<Uuid>,
    ) -> Result<Vec<TrainerProfile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profiles = sqlx::query_as::<_, TrainerProfile>(
            r#"
            SELECT * FROM trainer_profiles
            WHERE ($1::uuid IS NULL OR sport_id = $1)
            ORDER BY rating DESC, total_sessions DESC
            "#,
        )
        .bind(sport_id)
        .fetch_all(executor)
        .await?;
        Ok(profiles)
    }

    pub async fn set_verified<'e, E>(&self, executor: E, profile_id: Uuid, verified: bool) -> Result<TrainerProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerProfile>(
            "UPDATE trainer_profiles SET is_verified = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(profile_id)
        .bind(verified)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("trainer_profile"))
    }

    pub async fn set_available<'e, E>(&self, executor: E, profile_id: Uuid, available: bool) -> Result<TrainerProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerProfile>(
            "UPDATE trainer_profiles SET is_available = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(profile_id)
        .bind(available)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("trainer_profile"))
    }

    /// Grava o resultado de updateStatistics.
    pub async fn write_statistics<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        stats: &TrainerStatistics,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE trainer_profiles
            SET total_sessions = $2, rating = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .bind(stats.total_sessions)
        .bind(stats.rating)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn reset_monthly_earnings<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE trainer_profiles SET monthly_earnings = 0, updated_at = NOW() WHERE monthly_earnings <> 0",
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  FILHOS DO PERFIL
    // =========================================================================

    pub async fn list_availabilities<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<TrainerAvailability>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TrainerAvailability>(
            "SELECT * FROM trainer_availabilities WHERE trainer_profile_id = $1 ORDER BY day_of_week, start_time",
        )
        .bind(profile_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn add_availability<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        day: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
        is_available: bool,
    ) -> Result<TrainerAvailability, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerAvailability>(
            r#"
            INSERT INTO trainer_availabilities (trainer_profile_id, day_of_week, start_time, end_time, is_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(day)
        .bind(start_time)
        .bind(end_time)
        .bind(is_available)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, &[("trainer_availabilities_window_key", "availability_exists")]))
    }

    pub async fn list_certifications<'e, E>(&self, executor: E, profile_id: Uuid) -> Result<Vec<Certification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Certification>(
            "SELECT * FROM trainer_certifications WHERE trainer_profile_id = $1 ORDER BY issue_date DESC",
        )
        .bind(profile_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn add_certification<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        name: &str,
        issuing_organization: &str,
        issue_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Certification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Certification>(
            r#"
            INSERT INTO trainer_certifications (trainer_profile_id, name, issuing_organization, issue_date, expiry_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(name)
        .bind(issuing_organization)
        .bind(issue_date)
        .bind(expiry_date)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list_specialties<'e, E>(&self, executor: E, profile_id: Uuid) -> Result<Vec<Specialty>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Specialty>(
            "SELECT * FROM trainer_specialties WHERE trainer_profile_id = $1 ORDER BY specialty",
        )
        .bind(profile_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn add_specialty<'e, E>(&self, executor: E, profile_id: Uuid, specialty: &str) -> Result<Specialty, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Specialty>(
            "INSERT INTO trainer_specialties (trainer_profile_id, specialty) VALUES ($1, $2) RETURNING *",
        )
        .bind(profile_id)
        .bind(specialty)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, &[("trainer_specialties_profile_specialty_key", "specialty_exists")]))
    }

    pub async fn list_locations<'e, E>(&self, executor: E, profile_id: Uuid) -> Result<Vec<TrainerLocation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TrainerLocation>(
            "SELECT * FROM trainer_locations WHERE trainer_profile_id = $1 ORDER BY is_primary DESC, name",
        )
        .bind(profile_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn clear_primary_location<'e, E>(&self, executor: E, profile_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE trainer_locations SET is_primary = FALSE WHERE trainer_profile_id = $1 AND is_primary")
            .bind(profile_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn add_location<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
        location: &NewLocation<'_>,
    ) -> Result<TrainerLocation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, TrainerLocation>(
            r#"
            INSERT INTO trainer_locations (trainer_profile_id, name, address, latitude, longitude, is_primary)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(location.name)
        .bind(location.address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(location.is_primary)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    // =========================================================================
    //  SESSÕES
    // =========================================================================

    pub async fn create_session<'e, E>(&self, executor: E, draft: &SessionDraft) -> Result<TrainerSession, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let end_time = draft.end_time()?;
        let session = sqlx::query_as::<_, TrainerSession>(
            r#"
            INSERT INTO trainer_sessions (
                trainer_profile_id, trainee_membership_id, session_date, session_time,
                duration_minutes, end_time, status, fee_amount, payment_status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9)
            RETURNING *
            "#,
        )
        .bind(draft.trainer_profile_id)
        .bind(draft.trainee_membership_id)
        .bind(draft.session_date)
        .bind(draft.session_time)
        .bind(draft.duration_minutes)
        .bind(end_time)
        .bind(draft.status)
        .bind(draft.fee_amount)
        .bind(draft.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(session)
    }

    pub async fn find_session_for_update<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
    ) -> Result<Option<TrainerSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, TrainerSession>("SELECT * FROM trainer_sessions WHERE id = $1 FOR UPDATE")
            .bind(session_id)
            .fetch_optional(executor)
            .await?;
        Ok(session)
    }

    pub async fn find_session<'e, E>(&self, executor: E, session_id: Uuid) -> Result<Option<TrainerSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let session = sqlx::query_as::<_, TrainerSession>("SELECT * FROM trainer_sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(executor)
            .await?;
        Ok(session)
    }

    pub async fn list_sessions_for_trainer<'e, E>(
        &self,
        executor: E,
        profile_id: Uuid,
    ) -> Result<Vec<TrainerSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sessions = sqlx::query_as::<_, TrainerSession>(
            "SELECT * FROM trainer_sessions WHERE trainer_profile_id = $1 ORDER BY session_date DESC, session_time DESC",
        )
        .bind(profile_id)
        .fetch_all(executor)
        .await?;
        Ok(sessions)
    }

    /// Sessões em que o usuário é aluno (via matrícula) ou treinador.
    pub async fn list_sessions_for_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<TrainerSession>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sessions = sqlx::query_as::<_, TrainerSession>(
            r#"
            SELECT s.* FROM trainer_sessions s
            JOIN memberships m ON m.id = s.trainee_membership_id
            JOIN trainer_profiles t ON t.id = s.trainer_profile_id
            WHERE m.user_id = $1 OR t.user_id = $1
            ORDER BY s.session_date DESC, s.session_time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(sessions)
    }

    pub async fn update_session_status<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
        status: SessionStatus,
        payment_status: PaymentStatus,
    ) -> Result<TrainerSession, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerSession>(
            r#"
            UPDATE trainer_sessions
            SET status = $2, payment_status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(status)
        .bind(payment_status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("trainer_session"))
    }

    pub async fn rate_session<'e, E>(
        &self,
        executor: E,
        session_id: Uuid,
        rating: i16,
        feedback: Option<&str>,
    ) -> Result<TrainerSession, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerSession>(
            r#"
            UPDATE trainer_sessions
            SET trainee_rating = $2, feedback = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(rating)
        .bind(feedback)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("trainer_session"))
    }
}
