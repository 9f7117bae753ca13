use crate::{Effect, EffectResult, HttpError};

/// Request parameters, attached as the data of HTTP effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGetOptions {
    pub uri: String,
}

/// Payload handed to the message creator of a successful GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGetResult {
    /// Raw response body, neither parsed nor validated.
    pub data: String,
}

/// Issue one GET to `uri` and resolve to `msg_creator` of the body.
///
/// Only successful (2xx) responses produce an event. Network failures and
/// error statuses are logged and otherwise dropped, so a loop waiting on this
/// effect stays where it was. Use [`try_http_get`] when failures must reach
/// the transition function.
pub fn http_get<Event, F>(uri: impl Into<String>, msg_creator: F) -> Effect<Event>
where
    Event: Send + 'static,
    F: FnOnce(HttpGetResult) -> Event + Send + 'static,
{
    let options = HttpGetOptions { uri: uri.into() };
    let uri = options.uri.clone();

    Effect::new("http.get", move |_| {
        EffectResult::fallible(async move {
            let data = fetch(&uri).await?;
            Ok::<_, HttpError>(msg_creator(HttpGetResult { data }))
        })
    })
    .with_data(options)
}

/// Issue one GET to `uri` and always resolve to an event.
///
/// `msg_creator` receives the body on success and the [`HttpError`]
/// otherwise.
pub fn try_http_get<Event, F>(uri: impl Into<String>, msg_creator: F) -> Effect<Event>
where
    Event: Send + 'static,
    F: FnOnce(Result<HttpGetResult, HttpError>) -> Event + Send + 'static,
{
    let options = HttpGetOptions { uri: uri.into() };
    let uri = options.uri.clone();

    Effect::new("http.get", move |_| {
        EffectResult::single(async move {
            let result = fetch(&uri).await.map(|data| HttpGetResult { data });
            msg_creator(result)
        })
    })
    .with_data(options)
}

async fn fetch(uri: &str) -> Result<String, HttpError> {
    tracing::trace!(uri, "http get");
    let response = reqwest::get(uri).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.text().await?)
}
