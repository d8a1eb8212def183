//! Business logic services

pub mod appointments;
pub mod board;
pub mod catalog;
pub mod pricing;
pub mod reconciler;
pub mod status;

use std::sync::Arc;

use crate::{clock::Clock, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub appointments: appointments::AppointmentsService,
    pub reconciler: reconciler::Reconciler,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        let appointment_store = Arc::new(repository.appointments.clone());
        let catalog = catalog::CatalogService::new(Arc::new(repository.catalog.clone()));
        let board = board::AppointmentBoard::new();

        Self {
            appointments: appointments::AppointmentsService::new(
                appointment_store.clone(),
                catalog.clone(),
                board.clone(),
                clock.clone(),
            ),
            reconciler: reconciler::Reconciler::new(appointment_store, board, clock),
            catalog,
        }
    }
}
