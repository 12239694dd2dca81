//! GraphQL client for the Linear API.

use crate::error::{LinearError, Result};
use crate::types::{
    Connection, EntityNode, GraphQLRequest, GraphQLResponse, IssueCreateInput, IssueNode,
    IssueUpdateInput,
};
use async_trait::async_trait;
use cadence_core::item::TrackedItem;
use cadence_core::tracker::{CreateResult, ItemCreate, ItemUpdate, NamedEntity, Tracker};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

/// Linear API endpoint
pub const LINEAR_API_URL: &str = "https://api.linear.app/graphql";

const PAGE_SIZE: u32 = 100;

macro_rules! issue_fields {
    () => {
        "id identifier title description state { id } updatedAt completedAt canceledAt archivedAt snoozedUntilAt"
    };
}

macro_rules! page_info {
    () => {
        "pageInfo { hasNextPage endCursor }"
    };
}

const WORKFLOW_STATES: &str = concat!(
    "query WorkflowStates($first: Int!, $after: String) { workflowStates(first: $first, after: $after) { nodes { id name } ",
    page_info!(),
    " } }"
);

const TEAMS: &str = concat!(
    "query Teams($first: Int!, $after: String) { teams(first: $first, after: $after) { nodes { id name } ",
    page_info!(),
    " } }"
);

const PROJECTS: &str = concat!(
    "query Projects($first: Int!, $after: String) { projects(first: $first, after: $after) { nodes { id name } ",
    page_info!(),
    " } }"
);

const LABELS: &str = concat!(
    "query IssueLabels($first: Int!, $after: String) { issueLabels(first: $first, after: $after) { nodes { id name } ",
    page_info!(),
    " } }"
);

const ISSUES_BY_STATE: &str = concat!(
    "query IssuesByState($first: Int!, $after: String, $stateId: ID!) { issues(first: $first, after: $after, filter: { state: { id: { eq: $stateId } } }) { nodes { ",
    issue_fields!(),
    " } ",
    page_info!(),
    " } }"
);

const ALL_ISSUES: &str = concat!(
    "query AllIssues($first: Int!, $after: String) { issues(first: $first, after: $after) { nodes { ",
    issue_fields!(),
    " } ",
    page_info!(),
    " } }"
);

const SEARCH_ISSUES: &str = concat!(
    "query SearchIssues($first: Int!, $after: String, $text: String!) { issues(first: $first, after: $after, includeArchived: true, filter: { title: { containsIgnoreCase: $text } }) { nodes { ",
    issue_fields!(),
    " } ",
    page_info!(),
    " } }"
);

const ISSUE_UPDATE: &str =
    "mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) { issueUpdate(id: $id, input: $input) { success } }";

const ISSUE_CREATE: &str = concat!(
    "mutation IssueCreate($input: IssueCreateInput!) { issueCreate(input: $input) { success issue { ",
    issue_fields!(),
    " } } }"
);

/// Linear GraphQL client
#[derive(Debug, Clone)]
pub struct LinearClient {
    client: reqwest::Client,
    api_url: String,
}

impl LinearClient {
    /// Personal API keys (`lin_api_*`) are sent as-is; anything else is
    /// treated as an OAuth token and gets a `Bearer` prefix.
    pub fn new(api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(LinearError::InvalidToken("empty".into()));
        }

        let auth_value = if api_key.starts_with("lin_api_") {
            api_key.to_string()
        } else {
            format!("Bearer {api_key}")
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| LinearError::InvalidToken(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_url: LINEAR_API_URL.to_string(),
        })
    }

    /// Create a client with custom API URL (for testing)
    #[cfg(test)]
    pub fn with_url(api_key: &str, api_url: &str) -> Result<Self> {
        let mut client = Self::new(api_key)?;
        client.api_url = api_url.to_string();
        Ok(client)
    }

    async fn execute<V: Serialize, R: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: V,
    ) -> Result<R> {
        let request = GraphQLRequest { query, variables };

        let response = self.client.post(&self.api_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinearError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let gql_response: GraphQLResponse<R> = response.json().await?;

        if let Some(errors) = gql_response.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(LinearError::GraphQl(messages.join(", ")));
        }

        gql_response.data.ok_or(LinearError::MissingData)
    }

    /// Follow `pageInfo.endCursor` until the connection is exhausted.
    async fn collect_pages<R, T>(
        &self,
        query: &'static str,
        mut variables: Map<String, Value>,
        connection: impl Fn(R) -> Connection<T>,
    ) -> Result<Vec<T>>
    where
        R: DeserializeOwned,
    {
        let mut nodes = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;
        loop {
            variables.insert("first".into(), json!(PAGE_SIZE));
            variables.insert("after".into(), after.take().map_or(Value::Null, Value::String));

            let page = connection(self.execute(query, &variables).await?);
            pages += 1;
            nodes.extend(page.nodes);

            match page.page_info.end_cursor {
                Some(cursor) if page.page_info.has_next_page => after = Some(cursor),
                _ => break,
            }
        }
        debug!(pages, count = nodes.len(), "collected connection");
        Ok(nodes)
    }

    async fn entities<R: DeserializeOwned>(
        &self,
        query: &'static str,
        connection: impl Fn(R) -> Connection<EntityNode>,
    ) -> Result<Vec<NamedEntity>> {
        let nodes = self.collect_pages(query, Map::new(), connection).await?;
        Ok(nodes.into_iter().map(NamedEntity::from).collect())
    }

    async fn issues(&self, query: &'static str, variables: Map<String, Value>) -> Result<Vec<TrackedItem>> {
        #[derive(Deserialize)]
        struct Response {
            issues: Connection<IssueNode>,
        }

        let nodes = self
            .collect_pages(query, variables, |r: Response| r.issues)
            .await?;
        Ok(nodes.into_iter().map(TrackedItem::from).collect())
    }
}

#[async_trait]
impl Tracker for LinearClient {
    #[instrument(skip(self))]
    async fn list_workflow_states(&self) -> cadence_core::Result<Vec<NamedEntity>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            workflow_states: Connection<EntityNode>,
        }
        Ok(self
            .entities(WORKFLOW_STATES, |r: Response| r.workflow_states)
            .await?)
    }

    #[instrument(skip(self))]
    async fn list_teams(&self) -> cadence_core::Result<Vec<NamedEntity>> {
        #[derive(Deserialize)]
        struct Response {
            teams: Connection<EntityNode>,
        }
        Ok(self.entities(TEAMS, |r: Response| r.teams).await?)
    }

    #[instrument(skip(self))]
    async fn list_projects(&self) -> cadence_core::Result<Vec<NamedEntity>> {
        #[derive(Deserialize)]
        struct Response {
            projects: Connection<EntityNode>,
        }
        Ok(self.entities(PROJECTS, |r: Response| r.projects).await?)
    }

    #[instrument(skip(self))]
    async fn list_labels(&self) -> cadence_core::Result<Vec<NamedEntity>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            issue_labels: Connection<EntityNode>,
        }
        Ok(self.entities(LABELS, |r: Response| r.issue_labels).await?)
    }

    #[instrument(skip(self))]
    async fn list_items_by_state(&self, state_id: &str) -> cadence_core::Result<Vec<TrackedItem>> {
        let mut variables = Map::new();
        variables.insert("stateId".into(), json!(state_id));
        Ok(self.issues(ISSUES_BY_STATE, variables).await?)
    }

    #[instrument(skip(self))]
    async fn list_all_items(&self) -> cadence_core::Result<Vec<TrackedItem>> {
        Ok(self.issues(ALL_ISSUES, Map::new()).await?)
    }

    #[instrument(skip(self))]
    async fn search_items_by_title(&self, text: &str) -> cadence_core::Result<Vec<TrackedItem>> {
        let mut variables = Map::new();
        variables.insert("text".into(), json!(text));
        Ok(self.issues(SEARCH_ISSUES, variables).await?)
    }

    #[instrument(skip(self, update))]
    async fn update_item(&self, id: &str, update: ItemUpdate) -> cadence_core::Result<bool> {
        #[derive(Serialize)]
        struct Variables<'a> {
            id: &'a str,
            input: IssueUpdateInput,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            issue_update: Payload,
        }

        #[derive(Deserialize)]
        struct Payload {
            success: bool,
        }

        let variables = Variables {
            id,
            input: update.into(),
        };
        let response: Response = self.execute(ISSUE_UPDATE, variables).await?;
        Ok(response.issue_update.success)
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_item(&self, input: ItemCreate) -> cadence_core::Result<CreateResult> {
        #[derive(Serialize)]
        struct Variables {
            input: IssueCreateInput,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            issue_create: Payload,
        }

        #[derive(Deserialize)]
        struct Payload {
            success: bool,
            issue: Option<IssueNode>,
        }

        let response: Response = self
            .execute(ISSUE_CREATE, Variables { input: input.into() })
            .await?;
        let payload = response.issue_create;
        Ok(CreateResult {
            success: payload.success,
            item: payload.issue.map(TrackedItem::from),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
