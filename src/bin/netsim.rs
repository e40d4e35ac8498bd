//! 网络模型仿真
//!
//! 读取 JSON 模型，运行到给定时刻，打印统计汇总，可选输出完整 JSON 报告。

use anxsim_rs::SimError;
use anxsim_rs::net::{NetWorld, Network};
use anxsim_rs::sim::{DEFAULT_MONITOR_INTERVAL, ModelSpec, SimConfig, SimTime, Simulator};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "netsim", about = "离散事件网络仿真：按模型生成流量、逐跳转发、按策略排队服务")]
struct Args {
    /// 模型文件（JSON）
    #[arg(long)]
    model: PathBuf,

    /// 仿真运行到多少秒
    #[arg(long, default_value_t = 10.0)]
    until: f64,

    /// 随机种子
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// 队列长度采样间隔（秒）
    #[arg(long, default_value_t = DEFAULT_MONITOR_INTERVAL)]
    monitor_dt: f64,

    /// 打印每个节点的明细
    #[arg(long)]
    per_node: bool,

    /// 输出完整报告（账本、队列序列、计数）到 JSON 文件
    #[arg(long)]
    report_json: Option<PathBuf>,
}

fn print_stats(net: &Network, per_node: bool) {
    let stats = net.stats();
    if per_node {
        for node in net.nodes() {
            let s = stats.node(node.id);
            println!("node {} [{}] policy={}", node.name, node.node_type, node.policy.name());
            println!("  generated={} forwarded={}", s.generated.len(), s.forwarded.len());
            println!("  received={} discarded={}", s.received.len(), s.discarded.len());
            for (nb, sent) in &s.sent {
                let recv = s.recv.get(nb).copied().unwrap_or(0);
                println!(
                    "  -> {}: sent={} recv={}",
                    net.node(*nb).name,
                    sent,
                    recv
                );
            }
        }
    }

    let summary = net.summary();
    println!("total_sent={}", summary.sent);
    println!("total_recv={}", summary.recv);
    match summary.throughput {
        Some(t) => println!("throughput={t:.6}"),
        None => println!("throughput=n/a"),
    }
    println!(
        "generated={} received={} discarded={} completed_processes={}",
        summary.generated, summary.received, summary.discarded, summary.completed_processes
    );
}

fn run(args: &Args) -> Result<(), SimError> {
    let spec = ModelSpec::load(&args.model)?;
    let cfg = SimConfig {
        seed: args.seed,
        monitor_interval: args.monitor_dt,
    };

    let mut sim = Simulator::default();
    let mut world = NetWorld::setup(&spec, &cfg, &mut sim)?;

    let until = SimTime::from_secs_f64(args.until);
    sim.run_until(until, &mut world);

    println!("done @ {:.6}s", sim.now().as_secs_f64());
    print_stats(&world.net, args.per_node);

    if let Some(path) = &args.report_json {
        let report = world.net.report(until);
        let raw = serde_json::to_string_pretty(&report)?;
        fs::write(path, raw)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "仿真中止");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
