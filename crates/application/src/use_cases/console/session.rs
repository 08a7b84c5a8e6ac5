use crate::use_cases::zones::ZoneAdminUseCase;
use chiral_dns_domain::{parse_rdata, parse_ttl, DomainError, Name, RecordType, ZoneId, ROOT_ZONE};
use std::sync::Arc;

const MAIN_PROMPT: &str = "chiral-dns> ";

const MAIN_HELP: &[&str] = &[
    "Commands:",
    "  zone <name>          enter zone mode for an existing zone",
    "  add <name>           create a zone and enter it (prefix *. for a wildcard zone)",
    "  del <name>           delete an empty zone and its records",
    "  lz [name]            list child zones (of the root by default)",
    "  lr <name> [types..]  list records at a zone",
    "  find <name>          show how far a name resolves",
    "  stats                show store statistics",
    "  quit                 leave the console",
];

const ZONE_HELP: &[&str] = &[
    "Zone commands:",
    "  lr [types..]               list records in this zone",
    "  lz                         list child zones",
    "  add <type> <ttl> <args..>  add a record, e.g. 'add MX 12h 10 mail.example.com'",
    "  del <type>                 delete every record of a type",
    "  zone <name>                switch to another zone",
    "  back                       return to the main menu",
    "  help                       show this text",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleMode {
    Main,
    /// Inside a fully resolved zone.
    Zone(Name),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOutput {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl ConsoleOutput {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

/// Interactive administration console, one command line at a time.
pub struct ConsoleSession {
    admin: Arc<ZoneAdminUseCase>,
    mode: ConsoleMode,
}

impl ConsoleSession {
    pub fn new(admin: Arc<ZoneAdminUseCase>) -> Self {
        Self {
            admin,
            mode: ConsoleMode::Main,
        }
    }

    pub fn mode(&self) -> &ConsoleMode {
        &self.mode
    }

    pub fn prompt(&self) -> String {
        match &self.mode {
            ConsoleMode::Main => MAIN_PROMPT.to_string(),
            ConsoleMode::Zone(zone) => format!("{}> ", zone),
        }
    }

    /// Runs one line. Failures are reported as output, never returned.
    pub async fn execute(&mut self, line: &str) -> ConsoleOutput {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = args.split_first() else {
            return ConsoleOutput::default();
        };

        let result = match self.mode.clone() {
            ConsoleMode::Main => self.main_command(command, rest).await,
            ConsoleMode::Zone(zone) => self.zone_command(&zone, command, rest).await,
        };
        result.unwrap_or_else(|e| ConsoleOutput::line(format!("Error: {}", e)))
    }

    async fn main_command(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<ConsoleOutput, DomainError> {
        match (command.to_ascii_lowercase().as_str(), args) {
            ("help", _) => Ok(help(MAIN_HELP)),
            ("zone", [name]) => self.enter_zone(name).await,
            ("add", [name]) => {
                let (name, wildcard) = match name.strip_prefix("*.") {
                    Some(rest) => (rest, true),
                    None => (*name, false),
                };
                let zone = self.admin.add_name(&parse_name(name)?, wildcard).await?;
                let mut output = ConsoleOutput::line(format!(
                    "Zone {} added (id {}{})",
                    zone,
                    zone.zone_id(),
                    if zone.is_star() { ", wildcard" } else { "" }
                ));
                output.lines.push(format!("Entering zone {}", zone));
                self.mode = ConsoleMode::Zone(zone);
                Ok(output)
            }
            ("del", [name]) => {
                let zone = self.admin.find_zone(&parse_name(name)?).await?;
                self.admin.delete_zone(zone.zone_id()).await?;
                Ok(ConsoleOutput::line(format!("Zone {} deleted", zone)))
            }
            ("lz", []) => self.list_zones(&Name::root(), ROOT_ZONE).await,
            ("lz", [name]) => {
                let zone = self.admin.find_zone(&parse_name(name)?).await?;
                self.list_zones(&zone, zone.zone_id()).await
            }
            ("lr", [name, types @ ..]) => {
                let zone = self.admin.find_zone(&parse_name(name)?).await?;
                self.list_records(&zone, types).await
            }
            ("find", [name]) => self.find(name).await,
            ("stats", []) => self.stats().await,
            ("quit" | "exit", _) => Ok(ConsoleOutput {
                lines: vec!["Shutting down command console.".to_string()],
                quit: true,
            }),
            (
                "zone" | "add" | "del" | "lz" | "lr" | "find" | "stats",
                _,
            ) => Ok(ConsoleOutput::line(format!(
                "Wrong arguments for '{}'; try 'help'",
                command
            ))),
            _ => Ok(ConsoleOutput::line(format!("Unknown command: {}", command))),
        }
    }

    async fn zone_command(
        &mut self,
        zone: &Name,
        command: &str,
        args: &[&str],
    ) -> Result<ConsoleOutput, DomainError> {
        match (command.to_ascii_lowercase().as_str(), args) {
            ("help", _) => Ok(help(ZONE_HELP)),
            ("back", []) => {
                self.mode = ConsoleMode::Main;
                Ok(ConsoleOutput::default())
            }
            ("zone", [name]) => self.enter_zone(name).await,
            ("lr", types) => self.list_records(zone, types).await,
            ("lz", []) => self.list_zones(zone, zone.zone_id()).await,
            ("del", [record_type]) => {
                let record_type = parse_type(record_type)?;
                let removed = self.admin.delete_records(zone.zone_id(), record_type).await?;
                Ok(ConsoleOutput::line(format!(
                    "{} {} record(s) deleted",
                    removed, record_type
                )))
            }
            ("add", [record_type, ttl, rest @ ..]) if !rest.is_empty() => {
                let record_type = parse_type(record_type)?;
                let rdata = parse_rdata(record_type, parse_ttl(ttl)?, rest)?;
                let record = self.admin.add_record(zone, rdata).await?;
                Ok(ConsoleOutput::line(format!("Record added: {}", record)))
            }
            ("back" | "zone" | "lz" | "del" | "add", _) => Ok(ConsoleOutput::line(format!(
                "Wrong arguments for '{}'; try 'help'",
                command
            ))),
            _ => Ok(ConsoleOutput::line(format!("Unknown command: {}", command))),
        }
    }

    async fn enter_zone(&mut self, name: &str) -> Result<ConsoleOutput, DomainError> {
        let zone = self.admin.find_zone(&parse_name(name)?).await?;
        let output = ConsoleOutput::line(format!("Entering zone {} (id {})", zone, zone.zone_id()));
        self.mode = ConsoleMode::Zone(zone);
        Ok(output)
    }

    async fn list_zones(&self, parent: &Name, zone: ZoneId) -> Result<ConsoleOutput, DomainError> {
        let children = self.admin.list_children(zone).await?;
        if children.is_empty() {
            return Ok(ConsoleOutput::line(format!("{} has no child zones", parent)));
        }
        let suffix = if parent.is_root() {
            String::new()
        } else {
            parent.to_string()
        };
        let lines = children
            .into_iter()
            .map(|child| {
                let star = if child.wildcard { " *" } else { "" };
                format!("  {:>6}  {}.{}{}", child.id, child.label, suffix, star)
            })
            .collect();
        Ok(ConsoleOutput::lines(lines))
    }

    async fn list_records(
        &self,
        zone: &Name,
        types: &[&str],
    ) -> Result<ConsoleOutput, DomainError> {
        let types = types
            .iter()
            .map(|t| parse_type(t))
            .collect::<Result<Vec<_>, _>>()?;
        let listed = self.admin.list_records(zone.zone_id(), &types).await?;
        if listed.is_empty() {
            return Ok(ConsoleOutput::line(format!("No records at {}", zone)));
        }
        let mut lines = Vec::new();
        for (record_type, records) in listed {
            lines.push(format!("{} records:", record_type));
            lines.extend(
                records
                    .iter()
                    .map(|rdata| format!("     {} {}", rdata.ttl(), rdata)),
            );
        }
        Ok(ConsoleOutput::lines(lines))
    }

    async fn find(&self, name: &str) -> Result<ConsoleOutput, DomainError> {
        let name = parse_name(name)?;
        let resolved = self.admin.find(&name).await?;
        let line = if resolved.is_fully_resolved() {
            format!("{} is zone {}", name, resolved.zone_id())
        } else if resolved.resolved_count() == 0 {
            format!("{} is not in the store", name)
        } else {
            format!(
                "{} resolves as far as {} (zone {}{})",
                name,
                resolved.fully_resolved_prefix(),
                resolved.zone_id(),
                if resolved.is_star() { ", wildcard" } else { "" }
            )
        };
        Ok(ConsoleOutput::line(line))
    }

    async fn stats(&self) -> Result<ConsoleOutput, DomainError> {
        let stats = self.admin.statistics().await?;
        Ok(ConsoleOutput::lines(vec![
            "Resolver statistics:".to_string(),
            format!("Resolver started at: {}", stats.started_at),
            format!("Zone count: {}", stats.zones),
            format!("A record count: {}", stats.a_records),
            format!("NS record count: {}", stats.ns_records),
            format!("CNAME record count: {}", stats.cname_records),
            format!("MX record count: {}", stats.mx_records),
            format!("SOA record count: {}", stats.soa_records),
            format!("TXT record count: {}", stats.txt_records),
        ]))
    }
}

fn help(text: &[&str]) -> ConsoleOutput {
    ConsoleOutput::lines(text.iter().map(|line| line.to_string()).collect())
}

fn parse_name(text: &str) -> Result<Name, DomainError> {
    Ok(Name::parse(text)?)
}

fn parse_type(text: &str) -> Result<RecordType, DomainError> {
    let record_type: RecordType = text.parse().map_err(DomainError::InvalidRecord)?;
    if !record_type.is_supported() {
        return Err(DomainError::InvalidRecord(format!(
            "record type {} is not supported",
            record_type
        )));
    }
    Ok(record_type)
}
