// src/services/notification_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificationRepository,
    models::notification::{DomainEvent, Notification},
};

/// Destino das notificações. A entrega é externa; aqui só o gancho.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &DomainEvent) -> Result<(), AppError>;
}

/// Sink padrão: grava na tabela `notifications`.
pub struct DbNotificationSink {
    pool: PgPool,
    repo: NotificationRepository,
}

impl DbNotificationSink {
    pub fn new(pool: PgPool, repo: NotificationRepository) -> Self {
        Self { pool, repo }
    }
}

#[async_trait]
impl NotificationSink for DbNotificationSink {
    async fn deliver(&self, event: &DomainEvent) -> Result<(), AppError> {
        self.repo.insert(&self.pool, event).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    sink: Arc<dyn NotificationSink>,
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink>, repo: NotificationRepository) -> Self {
        Self { sink, repo }
    }

    /// Dispara e esquece. Chamado só depois do commit; falha na entrega
    /// vira log e nunca volta para a operação que gerou o evento.
    pub fn publish(&self, events: Vec<DomainEvent>) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            for event in events {
                if let Err(e) = sink.deliver(&event).await {
                    tracing::warn!("⚠️ Falha ao entregar notificação '{}' para {}: {:?}", event.kind(), event.user_id(), e);
                }
            }
        })
    }

    pub async fn list_mine(&self, pool: &PgPool, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, AppError> {
        self.repo.list_by_user(pool, user_id, unread_only).await
    }

    pub async fn mark_read(&self, pool: &PgPool, user_id: Uuid, notification_id: Uuid) -> Result<Notification, AppError> {
        self.repo.mark_read(pool, notification_id, user_id).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Guarda os eventos recebidos; opcionalmente falha em todos.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub delivered: Mutex<Vec<DomainEvent>>,
        pub fail: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(&self, event: &DomainEvent) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::InternalServerError(anyhow::anyhow!("canal fora do ar")));
            }
            self.delivered.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn renewed(user_id: Uuid) -> DomainEvent {
        DomainEvent::MembershipRenewed {
            user_id,
            membership_id: Uuid::new_v4(),
            expiry_date: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_delivers_every_event_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let service = NotificationService::new(sink.clone(), NotificationRepository::new());

        let first = renewed(Uuid::new_v4());
        let second = renewed(Uuid::new_v4());
        service.publish(vec![first.clone(), second.clone()]).await.unwrap();

        assert_eq!(*sink.delivered.lock().unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn delivery_failures_are_swallowed() {
        let sink = Arc::new(RecordingSink { fail: true, ..Default::default() });
        let service = NotificationService::new(sink.clone(), NotificationRepository::new());

        // A task termina normalmente mesmo com o sink falhando
        assert!(service.publish(vec![renewed(Uuid::new_v4())]).await.is_ok());
        assert!(sink.delivered.lock().unwrap().is_empty());
    }
}
