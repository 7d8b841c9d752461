use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::sync::{Client, Database};
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::executor::traits::PipelineSource;
use crate::pipeline::{Document, ResultSet, RuleError, SourceError, Stage};

/// MongoDB pipeline source
///
/// Runs pipelines through the synchronous MongoDB client. The client
/// owns a connection pool that is closed when the source is dropped.
pub struct MongoSource {
    database: Database,
}

impl MongoSource {
    /// Connect to the configured server and check it answers
    ///
    /// The ping goes to the auth database so bad credentials fail here
    /// rather than on the first pipeline.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, RuleError> {
        config.check()?;

        let options = client_options(config).map_err(RuleError::Connect)?;
        let client = Client::with_options(options)
            .map_err(|e| RuleError::Connect(SourceError::Driver(e)))?;

        client
            .database(&config.auth_database)
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|e| RuleError::Connect(SourceError::Driver(e)))?;

        log::info!(
            "Connected to {} (database '{}')",
            config.host,
            config.target_database
        );

        Ok(Self {
            database: client.database(&config.target_database),
        })
    }
}

/// Build driver options from a connection config
///
/// No selection criteria are set, so every read goes to the primary and
/// the test query and its follow-up see the same history.
pub fn client_options(config: &ConnectionConfig) -> Result<ClientOptions, SourceError> {
    let mut options = ClientOptions::default();
    options.hosts = vec![ServerAddress::parse(&config.host)?];
    options.connect_timeout = Some(config.connect_timeout());
    options.server_selection_timeout = Some(config.connect_timeout());

    if let Some(username) = &config.username {
        let mut credential = Credential::default();
        credential.username = Some(username.clone());
        credential.password = config.password.clone();
        credential.source = Some(config.auth_database.clone());
        options.credential = Some(credential);
    }

    Ok(options)
}

/// Convert a JSON stage to BSON, accepting extended JSON such as `{"$oid": ...}`
pub fn to_bson_stage(stage: &Stage) -> Result<BsonDocument, SourceError> {
    BsonDocument::try_from(stage.clone()).map_err(|e| SourceError::Conversion(e.to_string()))
}

/// Convert a BSON result document to relaxed extended JSON
pub fn to_json_document(document: BsonDocument) -> Result<Document, SourceError> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(SourceError::Conversion(format!(
            "expected a document, got {}",
            other
        ))),
    }
}

impl PipelineSource for MongoSource {
    fn has_collection(&self, collection: &str) -> Result<bool, SourceError> {
        let names = self
            .database
            .list_collection_names()
            .filter(doc! { "name": collection })
            .run()?;
        Ok(names.iter().any(|name| name == collection))
    }

    fn aggregate(&self, collection: &str, stages: &[Stage]) -> Result<ResultSet, SourceError> {
        let pipeline = stages
            .iter()
            .map(to_bson_stage)
            .collect::<Result<Vec<_>, _>>()?;

        self.database
            .collection::<BsonDocument>(collection)
            .aggregate(pipeline)
            .run()?
            .map(|document| to_json_document(document?))
            .collect()
    }
}
