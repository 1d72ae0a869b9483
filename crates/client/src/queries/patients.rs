use super::{
    checked_id, patient_all_key, patient_detail_key, patient_files_key, patient_list_key,
    patient_records_key,
};
use crate::{ApiClient, ClientResult, QueryClient};
use api_shared::{PageParams, Paginated};
use emr_core::{CoreError, MedicalRecord, Patient, PatientFile, PatientUpdate};

/// Page size used when walking the whole patient list.
const ALL_PAGE_SIZE: u32 = 100;
/// Stop walking after this many pages even if the backend keeps reporting more.
const MAX_PAGES: u32 = 1_000;

/// Parameters of `GET /patient`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientListParams {
    pub search: Option<String>,
    pub page: PageParams,
}

impl PatientListParams {
    fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(3);
        if let Some(search) = self.search() {
            query.push(("search", search.to_string()));
        }
        query.push(("page", self.page.page.to_string()));
        query.push(("limit", self.page.limit.to_string()));
        query
    }
}

#[derive(Clone)]
pub struct PatientQueries {
    api: ApiClient,
    queries: QueryClient,
}

impl PatientQueries {
    pub fn new(api: ApiClient, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    /// One page of patients.
    pub async fn list(&self, params: &PatientListParams) -> ClientResult<Paginated<Patient>> {
        let key = patient_list_key()
            .with_opt(params.search())
            .with(params.page.page)
            .with(params.page.limit);
        let api = self.api.clone();
        let query = params.to_query();
        self.queries
            .fetch(&key, move || {
                let api = api.clone();
                let query = query.clone();
                async move { api.get("/patient", &query).await }
            })
            .await
    }

    /// Every patient matching `search`, across all pages.
    ///
    /// Time folders and dashboard statistics are computed over the whole set.
    pub async fn all(&self, search: Option<&str>) -> ClientResult<Vec<Patient>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let key = patient_all_key().with_opt(search.as_deref());
        let api = self.api.clone();
        self.queries
            .fetch(&key, move || {
                let api = api.clone();
                let search = search.clone();
                async move { fetch_all_pages(&api, search).await }
            })
            .await
    }

    pub async fn detail(&self, id: &str) -> ClientResult<Patient> {
        let id = checked_id(id)?.to_string();
        let path = format!("/patient/{id}");
        self.get_cached(patient_detail_key(&id), path).await
    }

    pub async fn records(&self, id: &str) -> ClientResult<Vec<MedicalRecord>> {
        let id = checked_id(id)?.to_string();
        let path = format!("/patient/{id}/medical-records");
        self.get_cached(patient_records_key(&id), path).await
    }

    pub async fn files(&self, id: &str) -> ClientResult<Vec<PatientFile>> {
        let id = checked_id(id)?.to_string();
        let path = format!("/patient/{id}/files");
        self.get_cached(patient_files_key(&id), path).await
    }

    /// Updates a patient.
    ///
    /// A cached detail is patched immediately; it is replaced with the server copy on success
    /// and restored on failure. Cached lists are dropped once the write lands.
    pub async fn update(&self, id: &str, update: &PatientUpdate) -> ClientResult<Patient> {
        if update.is_empty() {
            return Err(CoreError::InvalidInput("no fields to update".into()).into());
        }
        let id = checked_id(id)?;
        let key = patient_detail_key(id);

        let previous: Option<Patient> = self.queries.get_query_data(&key).await;
        if let Some(mut optimistic) = previous.clone() {
            optimistic.apply_update(update);
            self.queries.set_query_data(&key, &optimistic).await?;
        }

        let result: ClientResult<Patient> = self.api.patch(&format!("/patient/{id}"), update).await;
        match result {
            Ok(saved) => {
                self.queries.set_query_data(&key, &saved).await?;
                self.queries.invalidate_prefix(&patient_list_key()).await;
                self.queries.invalidate_prefix(&patient_all_key()).await;
                tracing::info!(patient = %id, "patient updated");
                Ok(saved)
            }
            Err(e) => {
                match previous {
                    Some(previous) => self.queries.set_query_data(&key, &previous).await?,
                    None => self.queries.invalidate(&key).await,
                }
                Err(e)
            }
        }
    }

    async fn get_cached<T>(&self, key: crate::QueryKey, path: String) -> ClientResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        let api = self.api.clone();
        self.queries
            .fetch(&key, move || {
                let api = api.clone();
                let path = path.clone();
                async move { api.get(&path, &[]).await }
            })
            .await
    }
}

async fn fetch_all_pages(api: &ApiClient, search: Option<String>) -> ClientResult<Vec<Patient>> {
    let mut patients = Vec::new();
    for page in 1..=MAX_PAGES {
        let params = PatientListParams {
            search: search.clone(),
            page: PageParams::new(page, ALL_PAGE_SIZE),
        };
        let batch: Paginated<Patient> = api.get("/patient", &params.to_query()).await?;
        let done = batch.data.is_empty() || !batch.has_next();
        patients.extend(batch.data);
        if done {
            return Ok(patients);
        }
    }
    tracing::warn!(pages = MAX_PAGES, "patient list truncated");
    Ok(patients)
}
