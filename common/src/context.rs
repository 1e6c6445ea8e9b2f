use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use anyhow::anyhow;
use type_map::concurrent::TypeMap;

use crate::{
    error::{self, AddCode, ServiceError},
    repository::RepositoryObject,
};

/// Everything a handler may reach besides the request itself. Built once in
/// `main` (or in a test) and shared with every worker through `web::Data`.
pub struct ServiceState {
    pub repositories: TypeMap,
    pub service_name: String,
}

impl ServiceState {
    pub fn new(service_name: String) -> Self {
        Self {
            repositories: TypeMap::new(),
            service_name,
        }
    }

    pub fn insert(&mut self, repository: RepositoryObject) {
        self.repositories.insert(repository);
    }
}

#[derive(Clone)]
pub struct Context(pub Arc<ServiceState>);

impl Context {
    pub fn get_repository(&self) -> Option<RepositoryObject> {
        self.0.repositories.get::<RepositoryObject>().cloned()
    }

    pub fn try_get_repository(&self) -> error::Result<RepositoryObject> {
        self.get_repository()
            .ok_or(anyhow!("Issue repository is not configured").code(500))
    }
}

impl FromRequest for Context {
    type Error = ServiceError;

    type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<Data<Arc<ServiceState>>>() {
            Some(state) => Ok(Context(Arc::clone(state))),
            None => Err(anyhow!("No state provided").code(500)),
        };

        futures_util::future::ready(result)
    }
}
