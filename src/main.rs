// ==========================================
// 商城数据导入系统 - 命令行入口
// ==========================================
// 技术栈: Rust + SQLite
// 用法:
//   store-import <数据种类> <格式> <文件路径> [--details]
//   store-import <数据种类> <格式> --queue [队列名] [--details]
//   store-import --list
// ==========================================

use store_data_import::app::{self, AppState};
use store_data_import::logging;

/// 命令行参数
struct CliArgs {
    kind: Option<String>,
    format: Option<String>,
    file_path: Option<String>,
    queue: bool,
    queue_name: Option<String>,
    details: bool,
    list: bool,
    db_path: Option<String>,
    locale: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        kind: None,
        format: None,
        file_path: None,
        queue: false,
        queue_name: None,
        details: false,
        list: false,
        db_path: None,
        locale: None,
    };

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--list" => parsed.list = true,
            "--details" => parsed.details = true,
            "--queue" => {
                parsed.queue = true;
                // 队列名可选，紧随其后且不是选项时读取
                if let Some(next) = iter.peek() {
                    if !next.starts_with("--") {
                        parsed.queue_name = iter.next().cloned();
                    }
                }
            }
            "--db" => {
                parsed.db_path = Some(
                    iter.next()
                        .ok_or("--db 需要指定数据库路径")?
                        .clone(),
                );
            }
            "--locale" => {
                parsed.locale = Some(
                    iter.next().ok_or("--locale 需要指定语言代码")?.clone(),
                );
            }
            other if other.starts_with("--") => {
                return Err(format!("未知选项: {}", other));
            }
            positional => {
                if parsed.kind.is_none() {
                    parsed.kind = Some(positional.to_string());
                } else if parsed.format.is_none() {
                    parsed.format = Some(positional.to_string());
                } else if parsed.file_path.is_none() {
                    parsed.file_path = Some(positional.to_string());
                } else {
                    return Err(format!("多余的参数: {}", positional));
                }
            }
        }
    }
    Ok(parsed)
}

fn print_usage() {
    println!("用法:");
    println!("  store-import <数据种类> <格式> <文件路径> [--details]");
    println!("  store-import <数据种类> <格式> --queue [队列名] [--details]");
    println!("  store-import --list");
    println!();
    println!("选项:");
    println!("  --details        附带逐条失败明细");
    println!("  --db <路径>      指定数据库文件（默认用户数据目录）");
    println!("  --locale <代码>  报告语言（zh-CN / en，默认 zh-CN）");
}

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", store_data_import::APP_NAME);
    tracing::info!("系统版本: {}", store_data_import::VERSION);
    tracing::info!("==================================================");

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("参数错误: {}", msg);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Some(locale) = &args.locale {
        rust_i18n::set_locale(locale);
    }

    // 获取数据库路径
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| app::get_default_db_path().to_string_lossy().to_string());
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::init(&db_path).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    if args.list {
        print!(
            "{}",
            app::report::render_importer_list(&state.import_api.list_importers())
        );
        return;
    }

    let (kind, format) = match (&args.kind, &args.format) {
        (Some(kind), Some(format)) => (kind.clone(), format.clone()),
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    let run = if args.queue {
        state
            .import_api
            .run_queue_import(&kind, &format, args.queue_name.as_deref())
            .await
    } else {
        let file_path = match &args.file_path {
            Some(path) => path.clone(),
            None => {
                eprintln!("参数错误: 文件导入需要指定文件路径");
                print_usage();
                std::process::exit(2);
            }
        };
        state.import_api.run_file_import(&kind, &format, &file_path).await
    };

    match run {
        Ok(report) => {
            print!("{}", app::render_report(&report, args.details));
            // 存在失败行时以非零码退出，便于脚本判断
            if !report.result.failed_rows.is_empty() {
                std::process::exit(3);
            }
        }
        Err(e) => {
            eprintln!("导入失败: {}", e);
            std::process::exit(1);
        }
    }
}
