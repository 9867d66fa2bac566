//! Engine Module
//!
//! The protocol engine that coordinates all components.
//!
//! ## Responsibilities
//! - Dispatch verbs and validate their arguments before any backend call
//! - Start listings from request arguments or resume them from tokens
//! - Drive the pager, apply the date window, translate records
//! - Decide whether a listing continues and issue the next token

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::{NotificationSource, Pager, RetryPolicy, PAGE_SIZE};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::cursor::{self, Cursor, ResumptionToken};
use crate::dates::{self, Bound, GRANULARITY};
use crate::protocol::{
    Continuation, IdentifyInfo, ListResult, Payload, ProtocolError, Request, Response, Verb,
};
use crate::translate::{self, OAI_DC};
use crate::window;

/// Arguments that only make sense when starting a listing
const LISTING_ARGUMENTS: [&str; 4] = ["metadataPrefix", "from", "until", "set"];

/// The protocol engine
///
/// ## Concurrency Model: Shared Nothing
///
/// - All state lives in the request and its resumption token
/// - The engine itself is immutable after construction (`&self` everywhere),
///   so one `Arc<Engine>` serves any number of concurrent requests
/// - The only blocking work is the backend call inside [`Pager`]
pub struct Engine {
    /// Read-only configuration snapshot
    config: Arc<Config>,

    /// Paged access to the notification store
    pager: Pager,

    /// Time source for horizons, token issue/expiry and response dates
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Create an engine over a notification source using wall-clock time
    pub fn new(config: Config, source: Arc<dyn NotificationSource>) -> Self {
        Self::with_clock(config, source, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit time source
    pub fn with_clock(
        config: Config,
        source: Arc<dyn NotificationSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pager = Pager::new(
            source,
            Arc::clone(&clock),
            config.lookback,
            RetryPolicy::from(&config),
        );
        Self {
            config: Arc::new(config),
            pager,
            clock,
        }
    }

    /// Answer a request
    ///
    /// Never fails: protocol errors are part of the response.
    pub async fn handle(&self, request: Request) -> Response {
        let outcome = self.execute(&request).await;
        Response {
            request,
            response_date: self.now(),
            outcome,
        }
    }

    /// Execute a request
    ///
    /// Routes verbs to the appropriate handlers
    pub async fn execute(&self, request: &Request) -> Result<Payload, ProtocolError> {
        let result = self.dispatch(request).await;

        if let Err(err) = &result {
            if err.kind.is_infrastructure() {
                tracing::error!(
                    verb = request.raw_verb().unwrap_or("-"),
                    scope = %request.scope(),
                    "Request failed: {}",
                    err
                );
            } else {
                tracing::debug!(
                    verb = request.raw_verb().unwrap_or("-"),
                    scope = %request.scope(),
                    "Request rejected: {}",
                    err
                );
            }
        }

        result
    }

    async fn dispatch(&self, request: &Request) -> Result<Payload, ProtocolError> {
        let verb = match request.verb() {
            Some(verb) => verb,
            None if request.verb_repeated() => {
                return Err(ProtocolError::bad_verb("verb argument is repeated"))
            }
            None => {
                return Err(match request.raw_verb() {
                    Some(raw) => ProtocolError::bad_verb(format!("unrecognised verb {raw:?}")),
                    None => ProtocolError::bad_verb("missing verb argument"),
                })
            }
        };

        tracing::info!(verb = %verb, scope = %request.scope(), "Processing request");

        Self::check_arguments(verb, request)?;

        match verb {
            Verb::Identify => Ok(self.identify()),
            Verb::ListMetadataFormats => Ok(self.list_metadata_formats(request)),
            Verb::ListSets => Ok(Payload::ListSets),
            Verb::ListIdentifiers => Ok(Payload::ListIdentifiers(self.list(request).await?)),
            Verb::ListRecords => Ok(Payload::ListRecords(self.list(request).await?)),
            Verb::GetRecord => self.get_record(request).await,
        }
    }

    /// Reject repeated and illegal arguments
    fn check_arguments(verb: Verb, request: &Request) -> Result<(), ProtocolError> {
        if let Some(name) = request.repeated_arguments().next() {
            return Err(ProtocolError::bad_argument(format!(
                "argument {name:?} is repeated"
            )));
        }

        let legal = verb.legal_arguments();
        if let Some(name) = request.params().keys().find(|k| !legal.contains(&k.as_str())) {
            return Err(ProtocolError::bad_argument(format!(
                "argument {name:?} is not allowed for {verb}"
            )));
        }

        Ok(())
    }

    // =========================================================================
    // Stateless verbs
    // =========================================================================

    fn identify(&self) -> Payload {
        Payload::Identify(IdentifyInfo {
            repository_name: self.config.repository_name.clone(),
            admin_email: self.config.admin_email.clone(),
            earliest_datestamp: self.earliest_datestamp(),
            granularity: GRANULARITY,
            deleted_record: "no",
        })
    }

    /// Format support is global, so an identifier is echoed, not looked up
    fn list_metadata_formats(&self, request: &Request) -> Payload {
        let identifier = request.param("identifier").map(|raw| {
            translate::oai_identifier(&self.config.identifier_namespace, translate::internal_id(raw))
        });
        Payload::ListMetadataFormats {
            formats: vec![OAI_DC],
            identifier,
        }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// One page of ListIdentifiers / ListRecords
    ///
    /// Steps:
    /// 1. Build the cursor (fresh arguments, or decode the token)
    /// 2. Fetch the cursor's page from the backend
    /// 3. Cut the page at `until`
    /// 4. Translate, then decide whether there is a next page
    async fn list(&self, request: &Request) -> Result<ListResult, ProtocolError> {
        let (cursor, fresh) = match request.param("resumptionToken") {
            Some(token) => {
                if LISTING_ARGUMENTS.iter().any(|a| request.param(a).is_some()) {
                    tracing::debug!("resumptionToken supplied with listing arguments; ignoring the arguments");
                }
                (self.resume_cursor(request, token)?, false)
            }
            None => (self.fresh_cursor(request)?, true),
        };

        // Step 2: Backend page
        let page = self
            .pager
            .fetch(cursor.scope(), cursor.from(), cursor.page())
            .await?;
        let short_page = page.len() < PAGE_SIZE;

        // Step 3: Upper date bound
        let windowed = window::apply(page, cursor.until());

        if fresh && windowed.kept.is_empty() {
            return Err(ProtocolError::no_records_match());
        }

        // Step 4: Translate and continue
        let namespace = &self.config.identifier_namespace;
        let records = windowed
            .kept
            .iter()
            .map(|r| translate::translate(r, namespace))
            .collect();

        let next = if windowed.exhausted || short_page {
            None
        } else {
            cursor
                .next_page()
                .map(|next| self.continuation(next))
                .transpose()?
        };
        let offset = cursor.offset(PAGE_SIZE);

        tracing::debug!(
            page = cursor.page(),
            exhausted = windowed.exhausted,
            more = next.is_some(),
            "listing page built"
        );

        Ok(ListResult {
            records,
            next,
            resumed: !fresh,
            offset,
        })
    }

    /// Validate listing arguments and build the first cursor
    ///
    /// All checks happen here, before the backend is touched.
    fn fresh_cursor(&self, request: &Request) -> Result<Cursor, ProtocolError> {
        let prefix = request
            .param("metadataPrefix")
            .ok_or_else(|| ProtocolError::bad_argument("metadataPrefix is required"))?;
        if prefix != OAI_DC.prefix {
            return Err(ProtocolError::cannot_disseminate(prefix));
        }

        let from = Self::date_argument(request, "from", Bound::From)?;
        let until = Self::date_argument(request, "until", Bound::Until)?;
        if let (Some(f), Some(u)) = (from, until) {
            if f > u {
                return Err(ProtocolError::bad_argument(format!(
                    "from {} is after until {}",
                    dates::format_datestamp(&f),
                    dates::format_datestamp(&u)
                )));
            }
        }

        if let Some(set) = request.param("set") {
            return Err(ProtocolError::unknown_scope(format!(
                "set {set:?} does not exist; this repository has no sets"
            )));
        }

        // A bound at or past "now" can never cut anything off
        let now = self.clock.now();
        let until = until.filter(|u| *u <= now);

        // Pin the lower bound for every page of this listing
        let horizon = self.pager.horizon();
        let from = from.map_or(horizon, |f| f.max(horizon));
        if until.is_some_and(|u| u < from) {
            return Err(ProtocolError::no_records_match());
        }

        Cursor::first(request.scope().clone(), Some(from), until, prefix)
            .map_err(|e| ProtocolError::bad_argument(e.to_string()))
    }

    fn date_argument(
        request: &Request,
        name: &str,
        bound: Bound,
    ) -> Result<Option<DateTime<Utc>>, ProtocolError> {
        request
            .param(name)
            .map(|raw| {
                dates::parse_request_date(raw, bound).ok_or_else(|| {
                    ProtocolError::bad_argument(format!(
                        "{name} {raw:?} is not YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ"
                    ))
                })
            })
            .transpose()
    }

    /// Decode a token; its cursor alone determines the rest of the listing
    fn resume_cursor(&self, request: &Request, token: &str) -> Result<Cursor, ProtocolError> {
        let cursor = cursor::decode(token)?
            .into_live_cursor(self.clock.now(), self.config.token_lifetime)?;

        if cursor.scope() != request.scope() {
            return Err(ProtocolError::bad_cursor(format!(
                "token belongs to {}, not {}",
                cursor.scope(),
                request.scope()
            )));
        }
        if cursor.metadata_prefix() != OAI_DC.prefix {
            return Err(ProtocolError::bad_cursor(format!(
                "token carries unsupported metadata format {:?}",
                cursor.metadata_prefix()
            )));
        }

        Ok(cursor)
    }

    fn continuation(&self, cursor: Cursor) -> Result<Continuation, ProtocolError> {
        let issued_at = self.clock.now();
        let token = cursor::encode(&cursor, issued_at)?;
        let issued = ResumptionToken { cursor, issued_at };
        let expires_at = issued.expires_at(self.config.token_lifetime);

        Ok(Continuation {
            cursor: issued.cursor,
            token,
            expires_at,
        })
    }

    // =========================================================================
    // Single record
    // =========================================================================

    async fn get_record(&self, request: &Request) -> Result<Payload, ProtocolError> {
        let (Some(identifier), Some(prefix)) =
            (request.param("identifier"), request.param("metadataPrefix"))
        else {
            return Err(ProtocolError::bad_argument(
                "GetRecord requires identifier and metadataPrefix",
            ));
        };

        if prefix != OAI_DC.prefix {
            return Err(ProtocolError::cannot_disseminate(prefix));
        }

        let id = translate::internal_id(identifier);
        if id.is_empty() {
            return Err(ProtocolError::id_does_not_exist(identifier));
        }

        match self.pager.fetch_one(id).await? {
            Some(record) => Ok(Payload::GetRecord(translate::translate(
                &record,
                &self.config.identifier_namespace,
            ))),
            None => Err(ProtocolError::id_does_not_exist(identifier)),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Earliest datestamp currently reachable
    pub fn earliest_datestamp(&self) -> DateTime<Utc> {
        self.pager.horizon()
    }

    /// Current time as the engine sees it
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
