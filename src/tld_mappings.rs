use once_cell::sync::Lazy;
use std::collections::HashMap;

// Registry servers for the busiest TLDs. Anything not listed goes through
// IANA discovery.
const KNOWN_SERVERS: &[(&str, &str)] = &[
    // Generic TLDs
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.nic.info"),
    ("biz", "whois.nic.biz"),
    ("name", "whois.nic.name"),
    ("xyz", "whois.nic.xyz"),
    ("top", "whois.nic.top"),
    ("shop", "whois.nic.shop"),
    ("online", "whois.nic.online"),
    ("site", "whois.nic.site"),
    ("app", "whois.nic.google"),
    ("dev", "whois.nic.google"),
    ("ai", "whois.nic.ai"),
    ("io", "whois.nic.io"),
    ("co", "whois.nic.co"),
    ("me", "whois.nic.me"),
    // Country codes
    ("uk", "whois.nic.uk"),
    ("co.uk", "whois.nic.uk"),
    ("de", "whois.denic.de"),
    ("fr", "whois.nic.fr"),
    ("it", "whois.nic.it"),
    ("nl", "whois.domain-registry.nl"),
    ("be", "whois.dns.be"),
    ("ch", "whois.nic.ch"),
    ("se", "whois.iis.se"),
    ("pl", "whois.dns.pl"),
    ("jp", "whois.jprs.jp"),
    ("cn", "whois.cnnic.cn"),
    ("au", "whois.auda.org.au"),
    ("com.au", "whois.auda.org.au"),
    ("ca", "whois.cira.ca"),
    ("us", "whois.nic.us"),
    ("br", "whois.registro.br"),
    ("com.br", "whois.registro.br"),
    ("ru", "whois.tcinet.ru"),
    ("in", "whois.registry.in"),
];

/// Public suffix rules, in the publicsuffix.org list format, for the TLDs
/// above and the second-level registrations most often met under them.
pub const PUBLIC_SUFFIXES: &str = "\
// ===BEGIN ICANN DOMAINS===
com
net
org
info
biz
name
xyz
top
shop
online
site
app
dev
ai
com.ai
io
co
me
uk
co.uk
org.uk
me.uk
ltd.uk
plc.uk
net.uk
ac.uk
gov.uk
de
fr
it
nl
be
ch
se
pl
com.pl
jp
co.jp
ne.jp
or.jp
ac.jp
cn
com.cn
net.cn
org.cn
au
com.au
net.au
org.au
edu.au
ca
us
br
com.br
net.br
org.br
ru
in
co.in
net.in
org.in
// ===END ICANN DOMAINS===
";

static KNOWN_SERVER_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| KNOWN_SERVERS.iter().copied().collect());

/// Well-known whois server for a public suffix, if we ship one.
pub fn known_server(tld: &str) -> Option<&'static str> {
    KNOWN_SERVER_MAP.get(tld.trim_start_matches('.')).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_servers() {
        assert_eq!(known_server("com"), Some("whois.verisign-grs.com"));
        assert_eq!(known_server(".org"), Some("whois.pir.org"));
        assert_eq!(known_server("co.uk"), Some("whois.nic.uk"));
        assert_eq!(known_server("example"), None);
    }

    #[test]
    fn test_every_multi_label_server_has_a_suffix_rule() {
        let rules: Vec<&str> = PUBLIC_SUFFIXES
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .collect();
        for (tld, _) in KNOWN_SERVERS {
            assert!(rules.contains(tld), "{} has no suffix rule", tld);
        }
    }
}
