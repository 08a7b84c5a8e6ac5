use crate::di::UseCases;
use chiral_dns_domain::{dump_packet, Message, Name, Question, RecordType, ResourceRecord};
use chiral_dns_infrastructure::dns::UdpQueryClient;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;

pub async fn load_zone_file(use_cases: &UseCases, path: &Path) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;

    let report = use_cases
        .load_zone_file
        .execute(BufReader::new(file))
        .await?;

    info!(
        file = %path.display(),
        loaded = report.loaded,
        rejected = report.rejected.len(),
        "Zone file loaded"
    );
    println!("{} record(s) loaded from {}", report.loaded, path.display());
    for rejected in &report.rejected {
        println!("  line {}: {}", rejected.line, rejected.reason);
    }
    Ok(())
}

pub struct DigRequest<'a> {
    pub name: &'a str,
    pub record_type: &'a str,
    pub server: &'a str,
    pub port: u16,
    pub timeout: Duration,
}

pub async fn dig(request: DigRequest<'_>) -> anyhow::Result<()> {
    let name = Name::parse(request.name)?;
    let record_type: RecordType = request
        .record_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let server: IpAddr = request.server.parse()?;

    let client = UdpQueryClient::new(SocketAddr::new(server, request.port), request.timeout);
    let exchange = client.query(Question::new(name, record_type), true).await?;

    println!(";; Query to {}", client.server_addr());
    println!("{}", dump_packet(&exchange.query));
    println!(";; Response ({} bytes)", exchange.response.len());
    println!("{}", dump_packet(&exchange.response));

    let response = Message::parse(&exchange.response)?;
    let header = response.header();
    println!(
        ";; id {} rcode {} aa {} tc {}",
        header.id, header.rcode, header.authoritative, header.truncated
    );
    print_section("ANSWER", response.answer());
    print_section("AUTHORITY", response.authority());
    print_section("ADDITIONAL", response.additional());
    Ok(())
}

fn print_section(title: &str, records: &[ResourceRecord]) {
    if records.is_empty() {
        return;
    }
    println!(";; {} SECTION:", title);
    for record in records {
        println!("{}", record);
    }
}

pub async fn stats(use_cases: &UseCases, json: bool) -> anyhow::Result<()> {
    let stats = use_cases.admin.statistics().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Started at:    {}", stats.started_at);
    println!("Zones:         {}", stats.zones);
    println!("A records:     {}", stats.a_records);
    println!("NS records:    {}", stats.ns_records);
    println!("CNAME records: {}", stats.cname_records);
    println!("MX records:    {}", stats.mx_records);
    println!("SOA records:   {}", stats.soa_records);
    println!("TXT records:   {}", stats.txt_records);
    println!("Total records: {}", stats.total_records());
    Ok(())
}
