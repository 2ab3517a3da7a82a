// src/models/notification.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "membership_renewed")]
    pub kind: String,
    pub title: String,
    pub body: String,
    pub reference_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Eventos de ciclo de vida que os motores publicam depois do commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    MembershipPurchased { user_id: Uuid, membership_id: Uuid, membership_number: String },
    MembershipRenewed { user_id: Uuid, membership_id: Uuid, expiry_date: DateTime<Utc> },
    SessionBooked { user_id: Uuid, session_id: Uuid, starts_at: DateTime<Utc> },
    SessionCompleted { user_id: Uuid, session_id: Uuid, fee_amount: Decimal },
    SessionCancelled { user_id: Uuid, session_id: Uuid },
    TrainerRequestReceived { user_id: Uuid, request_id: Uuid },
    TrainerRequestAccepted { user_id: Uuid, request_id: Uuid },
    TrainerRequestDeclined { user_id: Uuid, request_id: Uuid },
    EventRegistered { user_id: Uuid, registration_id: Uuid, event_title: String },
    EventCancelled { user_id: Uuid, event_id: Uuid, event_title: String },
}

impl DomainEvent {
    /// Destinatário da notificação.
    pub fn user_id(&self) -> Uuid {
        match self {
            DomainEvent::MembershipPurchased { user_id, .. }
            | DomainEvent::MembershipRenewed { user_id, .. }
            | DomainEvent::SessionBooked { user_id, .. }
            | DomainEvent::SessionCompleted { user_id, .. }
            | DomainEvent::SessionCancelled { user_id, .. }
            | DomainEvent::TrainerRequestReceived { user_id, .. }
            | DomainEvent::TrainerRequestAccepted { user_id, .. }
            | DomainEvent::TrainerRequestDeclined { user_id, .. }
            | DomainEvent::EventRegistered { user_id, .. }
            | DomainEvent::EventCancelled { user_id, .. } => *user_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::MembershipPurchased { .. } => "membership_purchased",
            DomainEvent::MembershipRenewed { .. } => "membership_renewed",
            DomainEvent::SessionBooked { .. } => "session_booked",
            DomainEvent::SessionCompleted { .. } => "session_completed",
            DomainEvent::SessionCancelled { .. } => "session_cancelled",
            DomainEvent::TrainerRequestReceived { .. } => "trainer_request_received",
            DomainEvent::TrainerRequestAccepted { .. } => "trainer_request_accepted",
            DomainEvent::TrainerRequestDeclined { .. } => "trainer_request_declined",
            DomainEvent::EventRegistered { .. } => "event_registered",
            DomainEvent::EventCancelled { .. } => "event_cancelled",
        }
    }

    pub fn reference_id(&self) -> Uuid {
        match self {
            DomainEvent::MembershipPurchased { membership_id, .. }
            | DomainEvent::MembershipRenewed { membership_id, .. } => *membership_id,
            DomainEvent::SessionBooked { session_id, .. }
            | DomainEvent::SessionCompleted { session_id, .. }
            | DomainEvent::SessionCancelled { session_id, .. } => *session_id,
            DomainEvent::TrainerRequestReceived { request_id, .. }
            | DomainEvent::TrainerRequestAccepted { request_id, .. }
            | DomainEvent::TrainerRequestDeclined { request_id, .. } => *request_id,
            DomainEvent::EventRegistered { registration_id, .. } => *registration_id,
            DomainEvent::EventCancelled { event_id, .. } => *event_id,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DomainEvent::MembershipPurchased { .. } => "Matrícula confirmada",
            DomainEvent::MembershipRenewed { .. } => "Matrícula renovada",
            DomainEvent::SessionBooked { .. } => "Sessão agendada",
            DomainEvent::SessionCompleted { .. } => "Sessão concluída",
            DomainEvent::SessionCancelled { .. } => "Sessão cancelada",
            DomainEvent::TrainerRequestReceived { .. } => "Novo pedido de treino",
            DomainEvent::TrainerRequestAccepted { .. } => "Pedido aceito",
            DomainEvent::TrainerRequestDeclined { .. } => "Pedido recusado",
            DomainEvent::EventRegistered { .. } => "Inscrição confirmada",
            DomainEvent::EventCancelled { .. } => "Evento cancelado",
        }
    }

    pub fn body(&self) -> String {
        match self {
            DomainEvent::MembershipPurchased { membership_number, .. } => {
                format!("Sua matrícula {} está ativa.", membership_number)
            }
            DomainEvent::MembershipRenewed { expiry_date, .. } => {
                format!("Matrícula renovada até {}.", expiry_date.format("%d/%m/%Y"))
            }
            DomainEvent::SessionBooked { starts_at, .. } => {
                format!("Sessão marcada para {}.", starts_at.format("%d/%m/%Y %H:%M"))
            }
            DomainEvent::SessionCompleted { fee_amount, .. } => {
                format!("Sessão concluída. Valor: {}.", fee_amount)
            }
            DomainEvent::SessionCancelled { .. } => "Uma sessão foi cancelada.".to_string(),
            DomainEvent::TrainerRequestReceived { .. } => "Você recebeu um pedido de treino.".to_string(),
            DomainEvent::TrainerRequestAccepted { .. } => "Um treinador aceitou seu pedido.".to_string(),
            DomainEvent::TrainerRequestDeclined { .. } => "O treinador recusou seu pedido.".to_string(),
            DomainEvent::EventRegistered { event_title, .. } => format!("Inscrição feita em {}.", event_title),
            DomainEvent::EventCancelled { event_title, .. } => format!("O evento {} foi cancelado.", event_title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_exposes_recipient_and_reference() {
        let user = Uuid::new_v4();
        let membership = Uuid::new_v4();
        let event = DomainEvent::MembershipPurchased {
            user_id: user,
            membership_id: membership,
            membership_number: "MEM00000042".into(),
        };
        assert_eq!(event.user_id(), user);
        assert_eq!(event.reference_id(), membership);
        assert_eq!(event.kind(), "membership_purchased");
        assert!(event.body().contains("MEM00000042"));
    }
}
