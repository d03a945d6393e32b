//! Update command.

use super::Error;
use crate::error::Error as ErrorCommon;
use crate::finders::PublicIpv4;
use crate::providers::cloudflare::Updater;

use std::net::Ipv4Addr;

use tracing::{debug, info};

/// Settings of one execution of the update command.
#[derive(Debug)]
pub struct Settings<'a> {
    /// Name of the zone which contains the record.
    pub zone: &'a str,
    /// Name of the A record to update.
    pub record: &'a str,
    /// IP to set instead of the one found out by the finder.
    pub ip: Option<Ipv4Addr>,
    /// Do everything except updating the record.
    pub dry_run: bool,
}

impl Settings<'_> {
    /// Checks that the record belongs to the zone, that's, it's the zone apex
    /// or one of its subdomains.
    fn validate(&self) -> Result<(), ErrorCommon> {
        let belongs = self.record == self.zone
            || self
                .record
                .strip_suffix(self.zone)
                .map_or(false, |sub| sub.len() > 1 && sub.ends_with('.'));

        if !belongs {
            return Err(ErrorCommon::invalid_arguments(
                "settings{zone,record}",
                &format!(
                    "record {} doesn't belong to zone {}",
                    self.record, self.zone
                ),
            ));
        }

        Ok(())
    }
}

/// The result of a successful execution.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The record already pointed to the IP.
    Unchanged {
        /// The IP of the record.
        ip: Ipv4Addr,
    },
    /// The record has been updated.
    Updated {
        /// The content of the record before the update.
        previous: String,
        /// The IP that the record points to now.
        ip: Ipv4Addr,
    },
    /// The record would have been updated.
    DryRun {
        /// The current content of the record.
        previous: String,
        /// The IP that the record would point to.
        ip: Ipv4Addr,
    },
}

/// Points the A record indicated by `settings` to the public IP found by
/// `finder`, unless it already points to it.
///
/// Every lookup happens in order (zone, record, public IP) and the first
/// failure aborts the execution without sending any other request.
pub async fn execute(
    updater: &Updater,
    finder: &dyn PublicIpv4,
    settings: &Settings<'_>,
) -> Result<Outcome, Error> {
    settings.validate()?;

    let zone_id = updater.zone_id(settings.zone).await?;
    let record = updater.record_a(&zone_id, settings.record).await?;

    let ip = match settings.ip {
        Some(ip) => {
            debug!(%ip, "using the IP passed by arguments");
            ip
        }
        None => finder.ipv4().await?,
    };

    if record.content == ip.to_string() {
        info!(record = %record.name, %ip, "DNS record is up to date");
        return Ok(Outcome::Unchanged { ip });
    }

    if settings.dry_run {
        info!(
            record = %record.name,
            previous = %record.content,
            %ip,
            "dry run, DNS record not updated"
        );
        return Ok(Outcome::DryRun {
            previous: record.content,
            ip,
        });
    }

    updater.update_record_a(&zone_id, &record, ip).await?;
    info!(record = %record.name, previous = %record.content, "updated DNS record to {}", ip);

    Ok(Outcome::Updated {
        previous: record.content,
        ip,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ExternalService;
    use crate::finders::{self, ip_api};
    use crate::providers::{self, Provider};

    use serde_json::json;
    use tokio;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ZONE: &str = "example.com";
    const RECORD: &str = "host.example.com";

    fn success(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": result,
        }))
    }

    fn rejected() -> ResponseTemplate {
        ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}],
            "messages": [],
            "result": null,
        }))
    }

    /// Mounts the zones endpoint responding with `template` and expecting
    /// `calls` requests.
    async fn mount_zones(server: &MockServer, template: ResponseTemplate, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(template)
            .expect(calls)
            .mount(server)
            .await;
    }

    async fn mount_records(server: &MockServer, template: ResponseTemplate, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records/"))
            .respond_with(template)
            .expect(calls)
            .mount(server)
            .await;
    }

    async fn mount_ip(server: &MockServer, ip: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "success", "query": ip})),
            )
            .expect(calls)
            .mount(server)
            .await;
    }

    fn zones() -> ResponseTemplate {
        success(json!([
            {"id": "z0", "name": "example.org", "status": "active"},
            {"id": "z1", "name": "example.com", "status": "active"},
        ]))
    }

    fn records() -> ResponseTemplate {
        success(json!([
            {"id": "r0", "name": "host.example.com", "type": "AAAA", "content": "::1"},
            {"id": "r1", "name": "host.example.com", "type": "A", "content": "1.2.3.4"},
        ]))
    }

    fn clients(server: &MockServer) -> (Updater, ip_api::Finder) {
        let updater = Updater::with_base_url("admin@example.com", "token", &server.uri())
            .expect("valid updater arguments");
        let finder = ip_api::Finder::with_url(&format!("{}/json/", server.uri()))
            .expect("valid finder arguments");
        (updater, finder)
    }

    fn settings() -> Settings<'static> {
        Settings {
            zone: ZONE,
            record: RECORD,
            ip: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_settings_validate() {
        let ok = [
            ("example.com", "example.com"),
            ("example.com", "host.example.com"),
            ("example.com", "a.b.example.com"),
            ("example.com", "*.example.com"),
            ("example.com", "*.dev.example.com"),
        ];
        for (zone, record) in ok.iter() {
            let s = Settings {
                zone,
                record,
                ..settings()
            };
            assert!(s.validate().is_ok(), "{} belongs to {}", record, zone);
        }

        let invalid = [
            ("example.com", "example.org"),
            ("example.com", "hostexample.com"),
            ("example.com", ".example.com"),
            ("host.example.com", "example.com"),
            ("example.com", "*.example.org"),
        ];
        for (zone, record) in invalid.iter() {
            let s = Settings {
                zone,
                record,
                ..settings()
            };
            match s.validate() {
                Err(ErrorCommon::InvalidArguments(args)) => {
                    assert_eq!(args.names, "settings{zone,record}")
                }
                r => panic!("{} doesn't belong to {}, got: {:?}", record, zone, r),
            }
        }
    }

    #[tokio::test]
    async fn test_execute_record_outside_zone() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 0).await;

        let (updater, finder) = clients(&server);
        let settings = Settings {
            record: "host.example.org",
            ..settings()
        };
        match execute(&updater, &finder, &settings).await {
            Err(Error::Arguments(ErrorCommon::InvalidArguments(_))) => {}
            r => panic!("expected an invalid arguments error, got: {:?}", r),
        }
    }

    #[tokio::test]
    async fn test_execute_updates_outdated_record() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, records(), 1).await;
        mount_ip(&server, "5.6.7.8", 1).await;
        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/r1"))
            .and(body_json(json!({
                "type": "A",
                "name": "host.example.com",
                "content": "5.6.7.8",
                "ttl": 1,
            })))
            .respond_with(success(json!(
                {"id": "r1", "name": "host.example.com", "type": "A", "content": "5.6.7.8", "ttl": 1}
            )))
            .expect(1)
            .mount(&server)
            .await;

        let (updater, finder) = clients(&server);
        let outcome = execute(&updater, &finder, &settings())
            .await
            .expect("update succeeds");
        assert_eq!(
            outcome,
            Outcome::Updated {
                previous: String::from("1.2.3.4"),
                ip: Ipv4Addr::new(5, 6, 7, 8),
            }
        );
    }

    #[tokio::test]
    async fn test_execute_up_to_date_record() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, records(), 1).await;
        mount_ip(&server, "1.2.3.4", 1).await;
        Mock::given(method("PUT"))
            .respond_with(success(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let (updater, finder) = clients(&server);
        let outcome = execute(&updater, &finder, &settings())
            .await
            .expect("nothing to update");
        assert_eq!(
            outcome,
            Outcome::Unchanged {
                ip: Ipv4Addr::new(1, 2, 3, 4)
            }
        );
    }

    #[tokio::test]
    async fn test_execute_dry_run() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, records(), 1).await;
        mount_ip(&server, "5.6.7.8", 1).await;
        Mock::given(method("PUT"))
            .respond_with(success(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let (updater, finder) = clients(&server);
        let settings = Settings {
            dry_run: true,
            ..settings()
        };
        let outcome = execute(&updater, &finder, &settings)
            .await
            .expect("dry run succeeds");
        assert_eq!(
            outcome,
            Outcome::DryRun {
                previous: String::from("1.2.3.4"),
                ip: Ipv4Addr::new(5, 6, 7, 8),
            }
        );
    }

    #[tokio::test]
    async fn test_execute_ip_from_arguments() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, records(), 1).await;
        mount_ip(&server, "5.6.7.8", 0).await;
        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/r1"))
            .and(body_json(json!({
                "type": "A",
                "name": "host.example.com",
                "content": "9.8.7.6",
                "ttl": 1,
            })))
            .respond_with(success(json!(
                {"id": "r1", "name": "host.example.com", "type": "A", "content": "9.8.7.6"}
            )))
            .expect(1)
            .mount(&server)
            .await;

        let (updater, finder) = clients(&server);
        let settings = Settings {
            ip: Some(Ipv4Addr::new(9, 8, 7, 6)),
            ..settings()
        };
        let outcome = execute(&updater, &finder, &settings)
            .await
            .expect("update succeeds");
        assert_eq!(
            outcome,
            Outcome::Updated {
                previous: String::from("1.2.3.4"),
                ip: Ipv4Addr::new(9, 8, 7, 6),
            }
        );
    }

    #[tokio::test]
    async fn test_execute_zones_rejected_stops() {
        let server = MockServer::start().await;
        mount_zones(&server, rejected(), 1).await;
        mount_records(&server, records(), 0).await;
        mount_ip(&server, "5.6.7.8", 0).await;

        let (updater, finder) = clients(&server);
        match execute(&updater, &finder, &settings()).await {
            Err(Error::Provider(providers::Error::Provider(Provider::Rejected { errors }))) => {
                assert_eq!(errors[0].code, 10000)
            }
            r => panic!("expected a rejected error, got: {:?}", r),
        }
    }

    #[tokio::test]
    async fn test_execute_zone_not_found_stops() {
        let server = MockServer::start().await;
        mount_zones(&server, success(json!([])), 1).await;
        mount_records(&server, records(), 0).await;
        mount_ip(&server, "5.6.7.8", 0).await;

        let (updater, finder) = clients(&server);
        let err = execute(&updater, &finder, &settings())
            .await
            .expect_err("zone doesn't exist");
        assert_eq!(err.to_string(), "DNS provider: could not find zone example.com");
    }

    #[tokio::test]
    async fn test_execute_records_rejected_stops() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, rejected(), 1).await;
        mount_ip(&server, "5.6.7.8", 0).await;

        let (updater, finder) = clients(&server);
        match execute(&updater, &finder, &settings()).await {
            Err(Error::Provider(providers::Error::Provider(Provider::Rejected { .. }))) => {}
            r => panic!("expected a rejected error, got: {:?}", r),
        }
    }

    #[tokio::test]
    async fn test_execute_record_not_found_stops() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(
            &server,
            success(json!([
                {"id": "r0", "name": "host.example.com", "type": "AAAA", "content": "::1"},
            ])),
            1,
        )
        .await;
        mount_ip(&server, "5.6.7.8", 0).await;

        let (updater, finder) = clients(&server);
        let err = execute(&updater, &finder, &settings())
            .await
            .expect_err("record doesn't exist");
        assert_eq!(
            err.to_string(),
            "DNS provider: could not find DNS A record host.example.com"
        );
    }

    #[tokio::test]
    async fn test_execute_ip_lookup_failure_stops() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, records(), 1).await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "fail", "message": "private range"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(success(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let (updater, finder) = clients(&server);
        match execute(&updater, &finder, &settings()).await {
            Err(Error::Finder(finders::Error::Finder(ExternalService::Failed { reason }))) => {
                assert_eq!(reason, "could not get IP address: private range")
            }
            r => panic!("expected a finder failed error, got: {:?}", r),
        }
    }

    #[tokio::test]
    async fn test_execute_update_rejected() {
        let server = MockServer::start().await;
        mount_zones(&server, zones(), 1).await;
        mount_records(&server, records(), 1).await;
        mount_ip(&server, "5.6.7.8", 1).await;
        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/r1"))
            .respond_with(rejected())
            .expect(1)
            .mount(&server)
            .await;

        let (updater, finder) = clients(&server);
        let err = execute(&updater, &finder, &settings())
            .await
            .expect_err("update is rejected");
        assert_eq!(
            err.to_string(),
            "DNS provider: provider rejected the request: [10000] Authentication error"
        );
    }
}
