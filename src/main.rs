// Alphi寻宝命令行入口
// 开发心理：命令行只做参数解析和输出，生成、进度、存档逻辑都在库里
// 错误在这里统一转换为anyhow并以退出码1结束

use alphi_hunt::{
    save::FileProgressStore, validate_spot_spacing, CheckInOutcome, ConfigManager, ContentTables,
    GeoPoint, HuntConfig, HuntSession, ProgressStore, RegionCatalog, SpotGenerator,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "alphi-hunt", version, about = "Where's Alphi? 寻宝打卡点生成与进度管理")]
struct Cli {
    /// 配置文件路径，不存在时写出默认配置
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 列出区域目录
    Regions,
    /// 按种子和区域生成打卡点
    Generate {
        #[arg(long)]
        region: String,
        #[arg(long)]
        seed: String,
        /// 以JSON输出
        #[arg(long)]
        json: bool,
    },
    /// 开始新的寻宝（已有进度时继续）
    Start {
        #[arg(long)]
        device: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        seed: Option<String>,
    },
    /// 查看寻宝进度
    Status {
        #[arg(long)]
        device: String,
    },
    /// 在打卡点打卡
    CheckIn {
        #[arg(long)]
        device: String,
        #[arg(long)]
        spot: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// 提交反思
    Reflect {
        #[arg(long)]
        device: String,
        #[arg(long)]
        spot: String,
        #[arg(long)]
        text: String,
    },
    /// 报名线下活动
    SignUp {
        #[arg(long)]
        device: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

// 运行所需的全部上下文
struct AppContext {
    config: HuntConfig,
    catalog: RegionCatalog,
    generator: SpotGenerator,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("运行失败: {:#}", e);
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path)
            .with_context(|| format!("加载配置失败: {:?}", path))?,
        None => HuntConfig::default(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    alphi_hunt::init(&config)?;

    let ctx = load_context(config)?;
    match cli.command {
        Command::Regions => print_regions(&ctx.catalog),
        Command::Generate { region, seed, json } => generate(&ctx, &region, &seed, json)?,
        Command::Start { device, region, seed } => {
            let store = open_store(&ctx.config)?;
            let session = HuntSession::resume_or_start(
                &store,
                &ctx.catalog,
                &ctx.generator,
                ctx.config.gameplay.clone(),
                &device,
                &region,
                seed,
            )?;
            print_status(&session);
        }
        Command::Status { device } => {
            let store = open_store(&ctx.config)?;
            let session = resume(&ctx, &store, &device)?;
            print_status(&session);
        }
        Command::CheckIn { device, spot, lat, lon } => {
            let store = open_store(&ctx.config)?;
            let mut session = resume(&ctx, &store, &device)?;
            match session.check_in(&spot, GeoPoint::new(lat, lon))? {
                CheckInOutcome::FirstVisit(collectible) => {
                    println!("打卡成功! 获得收藏品: {} ({})", collectible.name, collectible.id)
                }
                CheckInOutcome::AlreadyVisited => println!("{} 已经打卡过了", spot),
            }
            let target = session.spot(&spot)?;
            println!("{}: {}", target.verse_ref, target.verse);
            for prompt in &target.reflection_prompts {
                println!("  - {}", prompt);
            }
        }
        Command::Reflect { device, spot, text } => {
            let store = open_store(&ctx.config)?;
            let mut session = resume(&ctx, &store, &device)?;
            session.reflect(&spot, &text)?;
            println!("已保存 {} 的反思", spot);
        }
        Command::SignUp { device, name, email } => {
            let store = open_store(&ctx.config)?;
            let mut session = resume(&ctx, &store, &device)?;
            let signup = session.sign_up(&name, &email)?;
            println!("报名成功: {} <{}>", signup.name, signup.email);
        }
    }

    Ok(())
}

fn load_context(config: HuntConfig) -> Result<AppContext> {
    let catalog = match &config.storage.regions_file {
        Some(path) => RegionCatalog::load_from_file(path)
            .with_context(|| format!("加载区域目录失败: {:?}", path))?,
        None => RegionCatalog::builtin(),
    };
    let content = match &config.storage.content_file {
        Some(path) => ContentTables::load_from_file(path)
            .with_context(|| format!("加载内容表失败: {:?}", path))?,
        None => ContentTables::builtin(),
    };
    let generator = SpotGenerator::new(content, config.generation.clone())?;

    Ok(AppContext {
        config,
        catalog,
        generator,
    })
}

fn open_store(config: &HuntConfig) -> Result<FileProgressStore> {
    let dir = config.storage.data_dir.join("progress");
    FileProgressStore::new(&dir).with_context(|| format!("无法打开存档目录: {:?}", dir))
}

fn resume<'a, S: ProgressStore>(ctx: &AppContext, store: &'a S, device: &str) -> Result<HuntSession<'a, S>> {
    let session = HuntSession::resume(
        store,
        &ctx.catalog,
        &ctx.generator,
        ctx.config.gameplay.clone(),
        device,
    )?;
    Ok(session)
}

fn print_regions(catalog: &RegionCatalog) {
    for region in catalog.regions() {
        println!(
            "{:<12} {:<16} ({:.4}, {:.4}) r={}m",
            region.key, region.name, region.center.lat, region.center.lon, region.radius_m
        );
    }
}

fn generate(ctx: &AppContext, region_key: &str, seed: &str, json: bool) -> Result<()> {
    let region = ctx.catalog.get(region_key)?;
    let generation = ctx.generator.generate_with_report(region, seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&generation.spots)?);
        return Ok(());
    }

    println!("{} / seed \"{}\"", region.name, seed);
    for spot in &generation.spots {
        println!(
            "{:<8} {:>10.6} {:>11.6}  {}  [{}]",
            spot.id, spot.lat, spot.lon, spot.title, spot.verse_ref
        );
    }
    let spaced = validate_spot_spacing(&generation.spots, ctx.generator.settings().min_spacing_m);
    println!(
        "采样 {} 次, 间距{}",
        generation.attempts,
        if spaced { "满足" } else { "不足" }
    );
    Ok(())
}

fn print_status<S: ProgressStore>(session: &HuntSession<'_, S>) {
    let progress = session.progress();
    println!("设备: {}", progress.device_id);
    println!("区域: {} / 种子: {}", session.region().name, progress.seed);
    println!(
        "进度: {}/{} 打卡, {} 条反思, {} 个收藏品",
        progress.completed_count(),
        session.spots().len(),
        progress.reflection_count(),
        progress.collectibles.len()
    );
    for spot in session.spots() {
        let mark = match progress.visits.get(&spot.id) {
            Some(visit) if visit.reflection.is_some() => "✓✎",
            Some(_) => "✓ ",
            None => "  ",
        };
        println!("  [{}] {:<8} {:>10.6} {:>11.6}  {}", mark, spot.id, spot.lat, spot.lon, spot.title);
    }
    if let Some(signup) = &progress.event_signup {
        println!("已报名线下活动: {}", signup.name);
    } else if session.is_complete() {
        println!("全部打卡完成，可以报名线下活动");
    }
}
