use std::error::Error;

use reqwest::Method;

use crate::core::config::ClientConfig;
use crate::core::session::SessionIdentity;
use crate::gateway::proxy::{build_proxied_request, Provider, ProviderRequest, ProxyRequestInit};

/// Split a `Name: Value` header argument.
pub fn parse_header_arg(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("Header must look like 'Name: Value': {raw}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Header name is empty: {raw}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Target, method and surviving header names. Header values are never shown.
pub fn describe_request(request: &ProviderRequest) -> String {
    let mut output = String::new();
    output.push_str(&format!("target:   {}\n", request.target_url));
    output.push_str(&format!("provider: {}\n", request.provider));
    output.push_str(&format!("method:   {}\n", request.method));
    let mut names: Vec<&str> = request.headers.keys().map(|name| name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    output.push_str(&format!("headers:  {}\n", names.join(", ")));
    output
}

pub fn show_proxy_target(
    config: &ClientConfig,
    session: &SessionIdentity,
    provider: &str,
    url: &str,
    method: Option<&str>,
    headers: &[String],
) -> Result<(), Box<dyn Error>> {
    let mut init = ProxyRequestInit::default();
    if let Some(method) = method {
        init = init.with_method(Method::from_bytes(method.to_ascii_uppercase().as_bytes())?);
    }
    for raw in headers {
        let (name, value) = parse_header_arg(raw)?;
        init = init.with_header(&name, &value);
    }

    let request = build_proxied_request(
        config.gateway_url(),
        session,
        &Provider::from(provider),
        url,
        Some(init),
    )?;
    print!("{}", describe_request(&request));
    Ok(())
}
