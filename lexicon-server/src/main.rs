use std::collections::HashMap;
use std::env;
use std::sync::{Arc, RwLock};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, put, web};
use log::{info, warn};
use serde::Deserialize;

use lexicon_core::io::ModelStore;
use lexicon_core::{AnswerFilter, Config, Error, Generator, NGramModel, Tokenizer};

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_STORE: &str = "./data";
const DEFAULT_LENGTH: usize = 50;
const DEFAULT_LIMIT: usize = 100;

/// Largest `length` or `limit` a request may ask for.
const MAX_LENGTH: usize = 1000;

/// Query parameters of `/v1/generate`
#[derive(Deserialize)]
struct GenerateParams {
	model: String,
	seed: Option<String>,
	length: Option<usize>,
}

/// Query parameters of `/v1/answer`
#[derive(Deserialize)]
struct AnswerParams {
	model: String,
	question: String,
	limit: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	names: Option<String>,
}

/// State shared by every worker.
///
/// Models are immutable once loaded, workers only clone the `Arc`. The lock
/// guards the registry itself and is taken for writing only when loading.
struct SharedData {
	store: ModelStore,
	config: Config,
	tokenizer: Tokenizer,
	models: RwLock<HashMap<String, Arc<NGramModel>>>,
}

impl SharedData {
	/// Returns a loaded model, loading it from the store on first use.
	fn model(&self, name: &str) -> Result<Arc<NGramModel>, HttpResponse> {
		if let Some(model) = self.models.read().map_err(|_| lock_failed())?.get(name) {
			return Ok(Arc::clone(model));
		}
		self.load(name)
	}

	fn load(&self, name: &str) -> Result<Arc<NGramModel>, HttpResponse> {
		let model = Arc::new(self.store.load(name).map_err(|e| error_response(&e))?);
		self.models
			.write()
			.map_err(|_| lock_failed())?
			.insert(name.to_owned(), Arc::clone(&model));
		info!("loaded model '{name}': {model}");
		Ok(model)
	}
}

fn lock_failed() -> HttpResponse {
	HttpResponse::InternalServerError().body("Model lock failed")
}

/// Applies the default, then rejects values above [`MAX_LENGTH`].
fn bounded(value: Option<usize>, default: usize, name: &str) -> Result<usize, HttpResponse> {
	match value.unwrap_or(default) {
		v if v > MAX_LENGTH => Err(HttpResponse::BadRequest().body(format!("{name} must be <= {MAX_LENGTH}, got {v}"))),
		v => Ok(v),
	}
}

/// Maps core errors to HTTP statuses.
fn error_response(error: &Error) -> HttpResponse {
	match error {
		Error::InvalidInput(_) | Error::InsufficientData { .. } => HttpResponse::BadRequest().body(error.to_string()),
		Error::ModelNotFound(_) => HttpResponse::NotFound().body(error.to_string()),
		Error::ModelNotReady => HttpResponse::Conflict().body(error.to_string()),
		_ => {
			warn!("request failed: {error}");
			HttpResponse::InternalServerError().body(error.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Continues `seed` (or a random key) with at most `length` words, `length <= 1000`.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let length = match bounded(query.length, DEFAULT_LENGTH, "length") {
		Ok(length) => length,
		Err(response) => return response,
	};
	let model = match data.model(&query.model) {
		Ok(model) => model,
		Err(response) => return response,
	};

	let mut generator = Generator::new(&model, &data.tokenizer, rand::rng()).with_history(data.config.history);
	let seed = query.seed.as_deref().unwrap_or_default();
	match generator.generate_text(seed, length) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/answer`
///
/// Answers `question`, which must end with '?', with at most `limit` words, `limit <= 1000`.
#[get("/v1/answer")]
async fn get_answer(data: web::Data<SharedData>, query: web::Query<AnswerParams>) -> impl Responder {
	let limit = match bounded(query.limit, DEFAULT_LIMIT, "limit") {
		Ok(limit) => limit,
		Err(response) => return response,
	};
	let model = match data.model(&query.model) {
		Ok(model) => model,
		Err(response) => return response,
	};

	let generator = Generator::new(&model, &data.tokenizer, rand::rng()).with_history(data.config.history);
	let mut filter =
		AnswerFilter::new(generator).with_lengths(data.config.answer_min_length, data.config.fallback_min_length);
	match filter.answer(&query.question, limit) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/models")]
async fn get_models(data: web::Data<SharedData>) -> impl Responder {
	match data.store.list() {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<SharedData>) -> impl Responder {
	let models = match data.models.read() {
		Ok(models) => models,
		Err(_) => return lock_failed(),
	};
	let mut names: Vec<&str> = models.keys().map(String::as_str).collect();
	names.sort_unstable();
	HttpResponse::Ok().body(names.join("\n"))
}

/// HTTP PUT endpoint `/v1/load_models?names=a,b`
///
/// (Re)loads the named models from the store, replacing loaded copies.
#[put("/v1/load_models")]
async fn put_models(data: web::Data<SharedData>, query: web::Query<ModelQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	for name in query_names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
		if let Err(response) = data.load(name) {
			return response;
		}
	}

	HttpResponse::Ok().body("Models loaded successfully")
}

fn load_config() -> std::io::Result<Config> {
	match env::var("LEXICON_CONFIG") {
		Ok(path) => Config::from_file(path).map_err(std::io::Error::other),
		Err(_) => Ok(Config::default()),
	}
}

/// Main entry point for the server.
///
/// Environment:
/// - `LEXICON_BIND`: listen address, default `127.0.0.1:5000`
/// - `LEXICON_STORE`: model directory, default `./data`
/// - `LEXICON_CONFIG`: optional JSON configuration file
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = load_config()?;
	let store_path = env::var("LEXICON_STORE").unwrap_or_else(|_| DEFAULT_STORE.to_owned());
	let store = ModelStore::open(&store_path).map_err(std::io::Error::other)?;
	let bind = env::var("LEXICON_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());

	let shared_data = web::Data::new(SharedData {
		store,
		tokenizer: config.tokenizer(),
		config,
		models: RwLock::new(HashMap::new()),
	});

	info!("serving models from {store_path} on http://{bind}");
	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_answer)
			.service(get_models)
			.service(get_loaded_models)
			.service(put_models)
	})
	.bind(bind)?
	.run()
	.await
}
