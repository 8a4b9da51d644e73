//! Stub collaborators for unit tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{
    engine::{RecommendationModel, RecommendationPrompt},
    error::{RecommendError, SearchError},
    models::{PlaceRecord, RecommendationSet},
    search::PlaceSearch,
};

pub struct StubSearch {
    reply: Result<Vec<PlaceRecord>, fn() -> SearchError>,
    queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn places(places: Vec<PlaceRecord>) -> Self {
        Self {
            reply: Ok(places),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> SearchError) -> Self {
        Self {
            reply: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearch for StubSearch {
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.reply {
            Ok(places) => Ok(places.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}

pub struct StubModel {
    reply: Result<RecommendationSet, fn() -> RecommendError>,
    prompts: Mutex<Vec<RecommendationPrompt>>,
}

impl StubModel {
    pub fn replying(recommendations: RecommendationSet) -> Self {
        Self {
            reply: Ok(recommendations),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> RecommendError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<RecommendationPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationModel for StubModel {
    async fn invoke(
        &self,
        prompt: &RecommendationPrompt,
    ) -> Result<RecommendationSet, RecommendError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.reply {
            Ok(recommendations) => Ok(recommendations.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}
