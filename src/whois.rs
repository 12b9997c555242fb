use crate::{config::Config, errors::WhoisError, parser::WhoisParser, tld_mappings, ParsedWhoisData};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use publicsuffix::{List, Psl};
use std::{collections::HashMap, sync::Arc};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::RwLock,
    time::timeout,
};
use tracing::{debug, info, warn};

// Public suffix list built from PUBLIC_SUFFIXES, shared across all service instances
static PSL: Lazy<List> = Lazy::new(|| {
    tld_mappings::PUBLIC_SUFFIXES.parse().unwrap_or_else(|e| {
        warn!("Built-in public suffix list rejected: {}", e);
        List::new()
    })
});

const IANA_WHOIS_SERVER: &str = "whois.iana.org";
const READ_CHUNK_SIZE: usize = 8192;

/// Anything that can answer a whois question for one domain.
///
/// The bulk fetcher only talks to this trait, so tests can drive it with a
/// canned resolver.
#[async_trait]
pub trait WhoisResolver: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisResult, WhoisError>;
}

#[derive(Debug, Clone)]
pub struct WhoisResult {
    pub server: String,
    pub raw_data: String,
    pub parsed_data: ParsedWhoisData,
}

/// Port-43 whois client with TLD server discovery and referral following.
pub struct WhoisService {
    config: Arc<Config>,
    parser: WhoisParser,
    tld_servers: RwLock<HashMap<String, String>>, // Discovered servers, per process
}

impl WhoisService {
    pub fn new(config: Arc<Config>) -> Self {
        match &config.whois_server {
            Some(server) => info!("WhoisService using fixed server {}:{}", server, config.whois_port),
            None => info!("WhoisService initialized with dynamic TLD discovery"),
        }

        Self {
            config,
            parser: WhoisParser::new(),
            tld_servers: RwLock::new(HashMap::new()),
        }
    }

    /// Extract TLD from domain using global PSL for accurate parsing
    fn extract_tld(&self, domain: &str) -> Result<String, WhoisError> {
        if let Some(parsed_domain) = PSL.domain(domain.as_bytes()) {
            return std::str::from_utf8(parsed_domain.suffix().as_bytes())
                .map(str::to_string)
                .map_err(|_| WhoisError::InvalidDomain(format!("Invalid UTF-8 in TLD for domain: {}", domain)));
        }

        warn!("Public suffix parsing failed for {}, using fallback", domain);
        domain
            .rsplit('.')
            .next()
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .ok_or_else(|| WhoisError::InvalidDomain(format!("No TLD found in domain: {}", domain)))
    }

    async fn find_whois_server(&self, tld: &str) -> Result<String, WhoisError> {
        if let Some(server) = &self.config.whois_server {
            return Ok(server.clone());
        }

        if let Some(server) = tld_mappings::known_server(tld) {
            return Ok(server.to_string());
        }

        // Second-level suffixes such as org.uk are served by the TLD registry.
        let tld = tld.rsplit('.').next().unwrap_or(tld);
        if let Some(server) = tld_mappings::known_server(tld) {
            return Ok(server.to_string());
        }

        {
            let servers = self.tld_servers.read().await;
            if let Some(server) = servers.get(tld) {
                return Ok(server.clone());
            }
        }

        if let Some(server) = self.discover_whois_server(tld).await {
            self.tld_servers.write().await.insert(tld.to_string(), server.clone());
            return Ok(server);
        }

        Err(WhoisError::UnsupportedTld(tld.to_string()))
    }

    async fn discover_whois_server(&self, tld: &str) -> Option<String> {
        debug!("Discovering whois server for TLD: {}", tld);

        // IANA knows the registry server for every delegated TLD
        match self.execute_whois_query(IANA_WHOIS_SERVER, tld).await {
            Ok(response) => {
                if let Some(server) = extract_iana_server(&response) {
                    info!("Discovered whois server via IANA for {}: {}", tld, server);
                    return Some(server);
                }
                debug!("No whois server in IANA answer for {}", tld);
            }
            Err(e) => debug!("Failed to query {}: {}", IANA_WHOIS_SERVER, e),
        }

        for pattern in generate_whois_patterns(tld) {
            debug!("Testing pattern server: {}", pattern);
            if self.test_whois_server(&pattern).await {
                info!("Discovered whois server via pattern for {}: {}", tld, pattern);
                return Some(pattern);
            }
        }

        warn!("Could not discover whois server for TLD: {}", tld);
        None
    }

    async fn test_whois_server(&self, server: &str) -> bool {
        match timeout(self.config.discovery_timeout(), TcpStream::connect((server, self.config.whois_port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Failed to connect to whois server {}: {}", server, e);
                false
            }
            Err(_) => {
                debug!("Timeout connecting to whois server: {}", server);
                false
            }
        }
    }

    async fn execute_whois_query(&self, server: &str, query: &str) -> Result<String, WhoisError> {
        let mut stream = timeout(
            self.config.whois_timeout(),
            TcpStream::connect((server, self.config.whois_port)),
        )
        .await??;

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

        let mut buffer = vec![0u8; READ_CHUNK_SIZE];
        let mut response = Vec::new();

        loop {
            match timeout(self.config.whois_timeout(), stream.read(&mut buffer)).await? {
                Ok(0) => break, // EOF
                Ok(n) => {
                    response.extend_from_slice(&buffer[..n]);
                    if response.len() > self.config.max_response_size {
                        return Err(WhoisError::ResponseTooLarge);
                    }
                }
                Err(e) => return Err(WhoisError::IoError(e)),
            }
        }

        debug!("{} answered {} bytes for {}", server, response.len(), query);
        String::from_utf8(response).map_err(|_| WhoisError::InvalidUtf8)
    }

    /// Each referral answer is appended to what came before, so the registry
    /// fields survive an empty or partial registrar answer. The parser keeps
    /// the first value it sees per field.
    async fn follow_referrals(&self, initial_server: &str, initial_data: String, domain: &str) -> (String, String) {
        let mut current_server = initial_server.to_string();
        let mut latest_answer = initial_data.clone();
        let mut current_data = initial_data;

        for _ in 0..self.config.max_referrals {
            let Some(referral_server) = extract_referral_server(&latest_answer) else {
                break;
            };
            if referral_server.eq_ignore_ascii_case(&current_server) {
                break;
            }

            debug!("Following referral from {} to {}", current_server, referral_server);
            match self.execute_whois_query(&referral_server, domain).await {
                Ok(new_data) => {
                    current_server = referral_server;
                    if !current_data.ends_with('\n') {
                        current_data.push('\n');
                    }
                    current_data.push_str(&new_data);
                    latest_answer = new_data;
                }
                Err(e) => {
                    warn!("Failed to query referral server {}: {}", referral_server, e);
                    break;
                }
            }
        }

        (current_server, current_data)
    }
}

#[async_trait]
impl WhoisResolver for WhoisService {
    async fn lookup(&self, domain: &str) -> Result<WhoisResult, WhoisError> {
        let domain = domain.trim().trim_end_matches('.').to_lowercase();

        if domain.is_empty() || !domain.contains('.') || domain.contains("..") || domain.starts_with('.') {
            return Err(WhoisError::InvalidDomain(domain));
        }

        // Registries expect the punycode form on the wire.
        let domain = idna::domain_to_ascii(&domain).map_err(|_| WhoisError::InvalidDomain(domain.clone()))?;
        if domain.len() > 253 {
            return Err(WhoisError::InvalidDomain("Domain name too long".to_string()));
        }

        let tld = self.extract_tld(&domain)?;
        let whois_server = self.find_whois_server(&tld).await?;
        let raw_data = self.execute_whois_query(&whois_server, &domain).await?;
        let (server, raw_data) = self.follow_referrals(&whois_server, raw_data, &domain).await;
        let parsed_data = self.parser.parse(&raw_data)?;

        Ok(WhoisResult { server, raw_data, parsed_data })
    }
}

fn generate_whois_patterns(tld: &str) -> Vec<String> {
    let mut patterns = vec![format!("whois.nic.{}", tld), format!("whois.{}", tld)];

    if tld.len() == 2 {
        patterns.push(format!("whois.domain.{}", tld));
        patterns.push(format!("whois.dns.{}", tld));
    }
    patterns.push(format!("whois.registry.{}", tld));

    patterns
}

/// `whois:` or `refer:` line of an IANA answer.
fn extract_iana_server(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        let key = key.trim().to_lowercase();
        (key == "whois" || key == "refer")
            .then(|| clean_server(value))
            .flatten()
    })
}

/// Server named by a registry answer as holding the fuller record.
fn extract_referral_server(data: &str) -> Option<String> {
    data.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        let key = key.trim().to_lowercase();
        ((key.contains("whois") && key.contains("server")) || key == "refer")
            .then(|| clean_server(value))
            .flatten()
    })
}

fn clean_server(value: &str) -> Option<String> {
    let value = value.trim();
    let value = value
        .strip_prefix("whois://")
        .or_else(|| value.strip_prefix("https://"))
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value);
    let host = value.split('/').next().unwrap_or(value).trim();

    (!host.is_empty() && !host.contains(char::is_whitespace)).then(|| host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{WhoisRecord, STATUS_REGISTERED};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::{net::TcpListener, sync::oneshot};

    const REFERRING_ANSWER: &str = "Domain Name: FOUND.COM\r\nRegistrar WHOIS Server: localhost\r\nRegistrar: Example Registrar\r\nCreation Date: 1997-09-15T04:00:00Z\r\nName Server: NS1.FOUND.COM\r\n";

    const REGISTRY_ANSWER: &str = "Domain Name: EXAMPLE.COM\r\nRegistrar: RESERVED-Internet Assigned Numbers Authority\r\nCreation Date: 1995-08-14T04:00:00Z\r\nName Server: A.IANA-SERVERS.NET\r\n";

    /// One-shot whois server on localhost; returns its port.
    async fn serve_once(answer: Vec<u8>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut query = vec![0u8; 512];
            let _ = socket.read(&mut query).await;
            let _ = socket.write_all(&answer).await;
        });

        port
    }

    /// Whois server on localhost answering the n-th connection with
    /// `answers[n]`, repeating the last one; returns its port and a hit count.
    async fn serve_script(answers: Vec<Vec<u8>>) -> (u16, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let answer = answers[n.min(answers.len() - 1)].clone();
                let mut query = vec![0u8; 512];
                let _ = socket.read(&mut query).await;
                let _ = socket.write_all(&answer).await;
            }
        });

        (port, hits)
    }

    fn local_config(port: u16) -> Arc<Config> {
        Arc::new(Config {
            whois_server: Some("127.0.0.1".to_string()),
            whois_port: port,
            whois_timeout_seconds: 5,
            ..Config::default()
        })
    }

    #[test]
    fn test_extract_iana_server() {
        let answer = "% IANA WHOIS server\n\ndomain:       COM\nrefer:        whois.verisign-grs.com\n";
        assert_eq!(extract_iana_server(answer).as_deref(), Some("whois.verisign-grs.com"));
        assert_eq!(extract_iana_server("domain: EXAMPLE\n"), None);
    }

    #[test]
    fn test_extract_referral_server() {
        let answer = "Domain Name: GOOGLE.COM\nRegistrar WHOIS Server: whois.markmonitor.com\n";
        assert_eq!(extract_referral_server(answer).as_deref(), Some("whois.markmonitor.com"));

        let with_scheme = "Registrar WHOIS Server: http://Whois.Example-Registrar.com/\n";
        assert_eq!(extract_referral_server(with_scheme).as_deref(), Some("whois.example-registrar.com"));

        assert_eq!(extract_referral_server("Registrar WHOIS Server: \n"), None);
    }

    #[test]
    fn test_generate_whois_patterns() {
        let cc = generate_whois_patterns("fi");
        assert_eq!(cc.first().map(String::as_str), Some("whois.nic.fi"));
        assert!(cc.contains(&"whois.dns.fi".to_string()));

        let generic = generate_whois_patterns("museum");
        assert!(!generic.contains(&"whois.dns.museum".to_string()));
    }

    #[test]
    fn test_extract_tld() {
        let service = WhoisService::new(Arc::new(Config::default()));
        assert_eq!(service.extract_tld("google.com").unwrap(), "com");
        assert_eq!(service.extract_tld("bbc.co.uk").unwrap(), "co.uk");
        assert_eq!(service.extract_tld("shop.example.org.uk").unwrap(), "org.uk");
        assert_eq!(service.extract_tld("example.com.au").unwrap(), "com.au");
        assert_eq!(service.extract_tld("example.zz").unwrap(), "zz");
    }

    #[tokio::test]
    async fn test_second_level_suffixes_use_the_registry_server() {
        let service = WhoisService::new(Arc::new(Config::default()));
        assert_eq!(service.find_whois_server("co.uk").await.unwrap(), "whois.nic.uk");
        assert_eq!(service.find_whois_server("org.uk").await.unwrap(), "whois.nic.uk");
        assert_eq!(service.find_whois_server("com.cn").await.unwrap(), "whois.cnnic.cn");
    }

    #[tokio::test]
    async fn test_domain_validation() {
        let service = WhoisService::new(Arc::new(Config::default()));

        let result = service.lookup("").await;
        assert!(matches!(result, Err(WhoisError::InvalidDomain(_))));

        let result = service.lookup("invalid").await;
        assert!(matches!(result, Err(WhoisError::InvalidDomain(_))));

        let result = service.lookup("bad..example.com").await;
        assert!(matches!(result, Err(WhoisError::InvalidDomain(_))));
    }

    #[tokio::test]
    async fn test_lookup_against_local_server() {
        let port = serve_once(REGISTRY_ANSWER.as_bytes().to_vec()).await;
        let service = WhoisService::new(local_config(port));

        let result = service.lookup("Example.COM").await.unwrap();

        assert_eq!(result.server, "127.0.0.1");
        assert_eq!(result.parsed_data.domain_name.as_deref(), Some("EXAMPLE.COM"));
        assert_eq!(
            result.parsed_data.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(result.parsed_data.name_servers, vec!["A.IANA-SERVERS.NET"]);
    }

    #[tokio::test]
    async fn test_lookup_reports_not_found() {
        let port = serve_once(b"No match for \"NOPE-NOPE.COM\".\r\n".to_vec()).await;
        let service = WhoisService::new(local_config(port));

        let result = service.lookup("nope-nope.com").await;
        assert!(matches!(result, Err(WhoisError::NotFound(ref line)) if line == "No match for \"NOPE-NOPE.COM\"."));
    }

    #[tokio::test]
    async fn test_response_size_limit() {
        let port = serve_once(vec![b'a'; 4096]).await;
        let config = Config {
            max_response_size: 1024,
            ..(*local_config(port)).clone()
        };
        let service = WhoisService::new(Arc::new(config));

        let result = service.lookup("example.com").await;
        assert!(matches!(result, Err(WhoisError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_answer() {
        let port = serve_once(vec![0xff, 0xfe, 0xfd]).await;
        let service = WhoisService::new(local_config(port));

        let result = service.lookup("example.com").await;
        assert!(matches!(result, Err(WhoisError::InvalidUtf8)));
    }

    #[tokio::test]
    async fn test_referral_answer_adds_to_registry_answer() {
        let registry = "Domain Name: FOUND.COM\r\nRegistrar WHOIS Server: localhost\r\nCreation Date: 1997-09-15T04:00:00Z\r\nName Server: NS1.FOUND.COM\r\n";
        let registrar = "Domain Name: found.com\r\nRegistrar: Example Registrar\r\nUpdated Date: 2024-01-02T03:04:05Z\r\n";
        let (port, hits) = serve_script(vec![registry.into(), registrar.into()]).await;
        let service = WhoisService::new(local_config(port));

        let result = service.lookup("found.com").await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(result.server, "localhost");
        let parsed = &result.parsed_data;
        assert_eq!(parsed.domain_name.as_deref(), Some("FOUND.COM"));
        assert_eq!(parsed.creation_date.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(parsed.name_servers, vec!["NS1.FOUND.COM"]);
        assert_eq!(parsed.registrar.as_deref(), Some("Example Registrar"));
        assert_eq!(parsed.updated_date.as_deref(), Some("2024-01-02T03:04:05Z"));
    }

    #[tokio::test]
    async fn test_empty_or_no_match_referral_keeps_registry_data() {
        for referral_answer in [&b""[..], &b"No match for \"FOUND.COM\".\r\n"[..]] {
            let (port, hits) = serve_script(vec![REFERRING_ANSWER.into(), referral_answer.to_vec()]).await;
            let service = WhoisService::new(local_config(port));

            let record = WhoisRecord::from_lookup("found.com", service.lookup("found.com").await);

            assert_eq!(hits.load(Ordering::SeqCst), 2);
            assert_eq!(record.registrar, "Example Registrar");
            assert_eq!(record.creation_date, "1997-09-15 04:00:00");
            assert_eq!(record.name_servers, "NS1.FOUND.COM");
            assert_eq!(record.status, STATUS_REGISTERED);
            assert_eq!(record.error_message, "");
        }
    }

    #[tokio::test]
    async fn test_failing_referral_keeps_last_good_answer() {
        let (port, hits) = serve_script(vec![REFERRING_ANSWER.into(), vec![0xff, 0xfe]]).await;
        let service = WhoisService::new(local_config(port));

        let result = service.lookup("found.com").await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(result.server, "127.0.0.1");
        assert_eq!(result.raw_data, REFERRING_ANSWER);
        assert_eq!(result.parsed_data.registrar.as_deref(), Some("Example Registrar"));
    }

    #[tokio::test]
    async fn test_referrals_stop_at_max_referrals() {
        // Two names for the same server, each answer pointing at the other.
        let to_localhost = b"Domain Name: LOOP.COM\r\nRegistrar: Loop\r\nWhois Server: localhost\r\n".to_vec();
        let to_loopback = b"Domain Name: LOOP.COM\r\nRegistrar: Loop\r\nWhois Server: 127.0.0.1\r\n".to_vec();
        let script: Vec<Vec<u8>> = (0..8)
            .map(|i| if i % 2 == 0 { to_localhost.clone() } else { to_loopback.clone() })
            .collect();

        let (port, hits) = serve_script(script.clone()).await;
        let config = Config {
            max_referrals: 3,
            ..(*local_config(port)).clone()
        };
        let result = WhoisService::new(Arc::new(config)).lookup("loop.com").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert_eq!(result.server, "localhost");

        let (port, hits) = serve_script(script).await;
        let config = Config {
            max_referrals: 0,
            ..(*local_config(port)).clone()
        };
        let result = WhoisService::new(Arc::new(config)).lookup("loop.com").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(result.server, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_unicode_domain_is_queried_as_punycode() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (query_tx, query_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 512];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let _ = query_tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
            let _ = socket.write_all(b"Domain Name: xn--bcher-kva.de\r\nRegistrar: Example\r\n").await;
        });

        let service = WhoisService::new(local_config(port));
        let lookup = service.lookup("Bücher.de").await;
        assert_eq!(query_rx.await.unwrap(), "xn--bcher-kva.de\r\n");

        let record = WhoisRecord::from_lookup("Bücher.de", lookup);
        assert_eq!(record.domain, "Bücher.de");
        assert_eq!(record.registrar, "Example");
    }
}
