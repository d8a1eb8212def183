//! In-memory appointment list shared by the API and the reconciler

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Appointment;

/// Last known state of every appointment.
///
/// Refreshed wholesale from the store on load and on every admin listing,
/// and patched record by record after each successful write.
#[derive(Clone, Default)]
pub struct AppointmentBoard {
    inner: Arc<RwLock<Vec<Appointment>>>,
}

impl AppointmentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, appointments: Vec<Appointment>) {
        *self.inner.write().await = appointments;
    }

    pub async fn snapshot(&self) -> Vec<Appointment> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Insert or replace by id. A record older than the one held is ignored.
    pub async fn upsert(&self, appointment: Appointment) {
        let mut list = self.inner.write().await;
        match list.iter_mut().find(|a| a.id == appointment.id) {
            Some(current) => {
                let older = matches!(
                    (current.updated_at, appointment.updated_at),
                    (Some(held), Some(incoming)) if incoming < held
                );
                if !older {
                    *current = appointment;
                }
            }
            None => list.push(appointment),
        }
    }

    pub async fn remove(&self, id: i32) {
        self.inner.write().await.retain(|a| a.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::status::tests::appointment;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_upsert_ignores_older_record() {
        let board = AppointmentBoard::new();
        let mut newer = appointment("2025-03-01", "10:00");
        newer.updated_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        newer.notes = Some("newer".to_string());
        board.upsert(newer.clone()).await;

        let mut older = newer.clone();
        older.updated_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
        older.notes = Some("older".to_string());
        board.upsert(older).await;

        let held = board.snapshot().await;
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].notes.as_deref(), Some("newer"));

        board.remove(newer.id).await;
        assert!(board.is_empty().await);
    }

    #[test]
    fn test_replace_drops_previous_contents() {
        tokio_test::block_on(async {
            let board = AppointmentBoard::new();
            board.upsert(appointment("2025-03-01", "10:00")).await;

            let mut other = appointment("2025-03-02", "11:00");
            other.id = 2;
            board.replace(vec![other]).await;

            let held = board.snapshot().await;
            assert_eq!(board.len().await, 1);
            assert_eq!(held[0].id, 2);
        });
    }
}
