// ── Vhost config parser ──
//
// Extracts domain, port, TLS flag and certificate path from the text of a
// single nginx-dialect server block file. Pure: every filesystem or
// subprocess concern lives in discovery.

use crate::error::ParseFailure;
use crate::model::{RawSiteEntry, SiteOrigin};

const WILDCARD_NAME: &str = "_";
const DEFAULT_PORT: u16 = 80;
const TLS_PORT: u16 = 443;

/// One `listen` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Listen {
    port: u16,
    ssl: bool,
}

/// Parse one config file into a site entry.
///
/// `path` is recorded verbatim; origin tagging is the caller's concern.
pub fn parse(path: &str, raw: &str, is_enabled: bool) -> Result<RawSiteEntry, ParseFailure> {
    let directives = directives(raw);

    let names = directives
        .iter()
        .find(|d| d.name == "server_name")
        .ok_or(ParseFailure::MissingServerName)?;
    let domain = select_domain(&names.args).ok_or(ParseFailure::EmptyServerName)?;

    let certificate = directives
        .iter()
        .find(|d| d.name == "ssl_certificate")
        .and_then(|d| d.args.first())
        .map(|arg| arg.trim().trim_matches(|c| c == '"' || c == '\'').to_owned());

    let listens = directives
        .iter()
        .filter(|d| d.name == "listen")
        .map(|d| parse_listen(&d.args));
    let (port, is_tls) = resolve_port(listens, certificate.is_some());

    Ok(RawSiteEntry {
        domain: domain.to_owned(),
        config_path: path.to_owned(),
        is_enabled,
        port,
        is_tls,
        cert_path: if is_tls { certificate } else { None },
        origin: SiteOrigin::Standard,
    })
}

/// First name that is not the `_` catch-all, else the first name verbatim.
fn select_domain<'a>(names: &[&'a str]) -> Option<&'a str> {
    names
        .iter()
        .find(|n| **n != WILDCARD_NAME)
        .or_else(|| names.first())
        .copied()
}

/// Resolve `(port, is_tls)` from listen directives in file order.
///
/// The first directive carrying `ssl` or naming port 443 wins outright.
/// Otherwise the first directive's port is kept provisionally. A
/// certificate with no TLS listener still means TLS on 443.
fn resolve_port(listens: impl IntoIterator<Item = Listen>, has_certificate: bool) -> (u16, bool) {
    let mut provisional: Option<u16> = None;
    for listen in listens {
        if listen.ssl || listen.port == TLS_PORT {
            return (listen.port, true);
        }
        provisional.get_or_insert(listen.port);
    }
    if has_certificate {
        return (TLS_PORT, true);
    }
    (provisional.unwrap_or(DEFAULT_PORT), false)
}

/// Parse `listen` arguments: `80`, `443 ssl`, `127.0.0.1:8443 ssl http2`,
/// `[::]:443 ssl`. An address without a port listens on 80.
fn parse_listen(args: &[&str]) -> Listen {
    let port = args
        .first()
        .and_then(|addr| {
            let candidate = addr.rsplit_once(':').map_or(*addr, |(_, port)| port);
            candidate.parse::<u16>().ok()
        })
        .unwrap_or(DEFAULT_PORT);
    let ssl = args.iter().skip(1).any(|flag| *flag == "ssl");
    Listen { port, ssl }
}

#[derive(Debug)]
struct Directive<'a> {
    name: &'a str,
    args: Vec<&'a str>,
}

/// Split config text into simple directives.
///
/// Comments are dropped per line, statements end at `;`, and block
/// delimiters are treated as statement boundaries. A statement may span
/// lines, so a `server_name` list wrapped over several lines stays whole.
fn directives(raw: &str) -> Vec<Directive<'_>> {
    let mut out = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    for line in raw.lines() {
        let mut rest = line.split_once('#').map_or(line, |(code, _)| code);
        while let Some(end) = rest.find([';', '{', '}']) {
            pending.extend(rest[..end].split_whitespace());
            flush(&mut pending, &mut out);
            rest = &rest[end + 1..];
        }
        pending.extend(rest.split_whitespace());
    }
    // An unterminated trailing statement still counts.
    flush(&mut pending, &mut out);
    out
}

fn flush<'a>(pending: &mut Vec<&'a str>, out: &mut Vec<Directive<'a>>) {
    let mut tokens = pending.drain(..);
    if let Some(name) = tokens.next() {
        out.push(Directive {
            name,
            args: tokens.collect(),
        });
    }
}
