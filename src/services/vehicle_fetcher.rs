//! Planificador de peticiones de vehículos
//!
//! Cada petición recibe un id monótono. Sólo se aplica la respuesta de la
//! última petición emitida; las respuestas atrasadas se descartan.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use validator::Validate;

use crate::client::VehicleSource;
use crate::dto::vehicle_dto::FetchParams;
use crate::models::vehicle::ApiContent;
use crate::services::enrichment_service::{compute_enriched_page, failed_page, FetchState};
use crate::utils::errors::{AppError, AppResult};

/// Petición emitida y pendiente de respuesta
#[derive(Debug, Clone)]
pub struct RequestTicket {
    pub id: u64,
    pub params: FetchParams,
}

pub struct VehicleFetcher {
    source: Arc<dyn VehicleSource>,
    state: Arc<RwLock<FetchState>>,
    latest_request: AtomicU64,
    loading: watch::Sender<bool>,
}

impl VehicleFetcher {
    pub fn new(source: Arc<dyn VehicleSource>) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(FetchState::default())),
            latest_request: AtomicU64::new(0),
            loading: watch::Sender::new(false),
        }
    }

    /// Copia del estado actual
    pub async fn state(&self) -> FetchState {
        self.state.read().await.clone()
    }

    /// Espera hasta que no haya ninguna petición pendiente de aplicar
    pub async fn wait_idle(&self) {
        let mut loading = self.loading.subscribe();
        // el Sender vive en self, así que wait_for no puede fallar aquí
        let _ = loading.wait_for(|is_loading| !*is_loading).await;
    }

    /// Emite una petición: nuevo id, `is_loading` a true y error limpio
    pub async fn begin(&self, params: FetchParams) -> RequestTicket {
        let mut state = self.state.write().await;
        let id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        state.is_loading = true;
        state.is_error = false;
        state.error = None;
        self.loading.send_replace(true);

        log::debug!(
            "🚀 Petición #{} page={} perPage={} trigger={}",
            id,
            params.page,
            params.per_page,
            params.fetch_trigger
        );
        RequestTicket { id, params }
    }

    /// Ejecuta la petición del ticket contra la fuente y aplica el resultado
    pub async fn run(&self, ticket: RequestTicket) -> bool {
        let result = match ticket.params.validate() {
            Ok(()) => self.source.list_with_paginate(&ticket.params.to_query()).await,
            Err(e) => Err(AppError::from(e)),
        };
        self.complete(ticket, result).await
    }

    /// `begin` + `run`
    pub async fn fetch(&self, params: FetchParams) -> bool {
        let ticket = self.begin(params).await;
        self.run(ticket).await
    }

    /// Aplica una respuesta. Devuelve false si el ticket ya no es el último.
    pub async fn complete(&self, ticket: RequestTicket, result: AppResult<ApiContent>) -> bool {
        let mut state = self.state.write().await;

        let latest = self.latest_request.load(Ordering::SeqCst);
        if ticket.id != latest {
            log::debug!(
                "⏭️ Descartando respuesta atrasada #{} (última emitida #{})",
                ticket.id,
                latest
            );
            return false;
        }

        let next = match result {
            Ok(content) => compute_enriched_page(&ticket.params, content, &state),
            Err(e) => {
                log::error!("❌ Error al buscar vehículos: {}", e);
                failed_page(&state, e.to_string())
            }
        };
        *state = next;
        self.loading.send_replace(false);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::vehicle_dto::VehicleQuery;
    use crate::models::vehicle::{VehicleRecord, VehicleStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeSource {
        queries: Mutex<Vec<VehicleQuery>>,
        plates: Vec<&'static str>,
    }

    #[async_trait]
    impl VehicleSource for FakeSource {
        async fn list_with_paginate(&self, query: &VehicleQuery) -> AppResult<ApiContent> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(content(&self.plates, query.page, 2))
        }
    }

    fn content(plates: &[&str], page: u32, total_pages: u32) -> ApiContent {
        ApiContent {
            vehicles: plates
                .iter()
                .map(|plate| VehicleRecord {
                    id: format!("id-{}", plate),
                    plate: plate.to_string(),
                    fleet: None,
                    vehicle_type: "vehicle".to_string(),
                    model: String::new(),
                    name_owner: String::new(),
                    status: VehicleStatus::Active,
                    created_at: None,
                })
                .collect(),
            location_vehicles: vec![],
            total_pages: Some(total_pages),
            page: Some(page),
            per_page: Some(20),
        }
    }

    fn params(page: u32, trigger: u64) -> FetchParams {
        FetchParams {
            filter: String::new(),
            vehicle_type: "tracked".to_string(),
            page,
            per_page: 20,
            fetch_trigger: trigger,
        }
    }

    fn fetcher_with(plates: Vec<&'static str>) -> (Arc<FakeSource>, VehicleFetcher) {
        let source = Arc::new(FakeSource {
            queries: Mutex::new(vec![]),
            plates,
        });
        let fetcher = VehicleFetcher::new(source.clone());
        (source, fetcher)
    }

    #[tokio::test]
    async fn test_loading_flag_lifecycle() {
        let (_, fetcher) = fetcher_with(vec!["AAA"]);
        let ticket = fetcher.begin(params(1, 1)).await;
        assert!(fetcher.state().await.is_loading);

        assert!(fetcher.run(ticket).await);
        let state = fetcher.state().await;
        assert!(!state.is_loading);
        assert_eq!(state.data.len(), 1);
        assert!(state.has_more);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (_, fetcher) = fetcher_with(vec![]);
        let old = fetcher.begin(params(1, 1)).await;
        let new = fetcher.begin(params(1, 2)).await;

        assert!(fetcher.complete(new, Ok(content(&["NEW"], 1, 1))).await);
        assert!(!fetcher.complete(old, Ok(content(&["OLD1", "OLD2"], 1, 1))).await);

        let state = fetcher.state().await;
        assert_eq!(state.data.len(), 1);
        assert_eq!(state.data[0].vehicle.plate, "NEW");
        assert_eq!(state.applied_trigger, Some(2));
    }

    #[tokio::test]
    async fn test_stale_response_keeps_loading_until_latest() {
        let (_, fetcher) = fetcher_with(vec![]);
        let old = fetcher.begin(params(1, 1)).await;
        let _new = fetcher.begin(params(1, 2)).await;

        fetcher.complete(old, Ok(content(&["OLD"], 1, 1))).await;
        let state = fetcher.state().await;
        assert!(state.is_loading);
        assert!(state.data.is_empty());
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data() {
        let (_, fetcher) = fetcher_with(vec!["AAA", "BBB"]);
        fetcher.fetch(params(1, 1)).await;

        let ticket = fetcher.begin(params(2, 1)).await;
        let error = AppError::ExternalApi {
            status: 500,
            message: "boom".to_string(),
        };
        fetcher.complete(ticket, Err(error)).await;

        let state = fetcher.state().await;
        assert!(state.is_error);
        assert!(!state.has_more);
        assert!(!state.is_loading);
        assert_eq!(state.data.len(), 2);
        let message = state.error.unwrap();
        assert!(message.contains("500") && message.contains("boom"));
    }

    #[tokio::test]
    async fn test_next_request_clears_error() {
        let (_, fetcher) = fetcher_with(vec!["AAA"]);
        let ticket = fetcher.begin(params(1, 1)).await;
        fetcher
            .complete(ticket, Err(AppError::Internal("caído".to_string())))
            .await;
        assert!(fetcher.state().await.is_error);

        fetcher.begin(params(1, 2)).await;
        let state = fetcher.state().await;
        assert!(!state.is_error);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_wait_idle_returns_after_latest_completes() {
        let (_, fetcher) = fetcher_with(vec![]);
        fetcher.wait_idle().await;

        let fetcher = Arc::new(fetcher);
        let ticket = fetcher.begin(params(1, 1)).await;
        let waiter = {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.wait_idle().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        fetcher.complete(ticket, Ok(content(&["AAA"], 1, 1))).await;
        waiter.await.unwrap();
        assert!(!fetcher.state().await.is_loading);
    }

    #[tokio::test]
    async fn test_invalid_params_never_reach_source() {
        let (source, fetcher) = fetcher_with(vec!["AAA"]);
        fetcher.fetch(params(0, 1)).await;

        assert!(source.queries.lock().unwrap().is_empty());
        let state = fetcher.state().await;
        assert!(state.is_error);
        assert!(state.error.unwrap().contains("Invalid parameters"));
    }

    #[tokio::test]
    async fn test_append_on_forward_pagination() {
        let (source, fetcher) = fetcher_with(vec!["AAA", "BBB"]);
        fetcher.fetch(params(1, 1)).await;
        fetcher.fetch(params(2, 1)).await;

        let state = fetcher.state().await;
        assert_eq!(state.data.len(), 4);
        assert!(!state.has_more);
        assert_eq!(source.queries.lock().unwrap()[1].page, 2);
    }
}
