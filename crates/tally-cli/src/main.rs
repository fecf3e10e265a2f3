use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use tally_core::{
    run, wallet_store_key, CancelToken, Codec, Encoding, KvSource, StoreKey, ADDRESSES_SET,
    STATS_KEY,
};
use tally_store::Store;

/// Seed file shape: wallet and stats records in the JSON wire form, keyed by
/// address. They are decoded once and re-encoded with the target codec.
#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    addresses: Vec<String>,
    #[serde(default)]
    wallets: BTreeMap<String, serde_json::Value>,
    stats: Option<serde_json::Value>,
}

fn cmd_verify(db: &str, encoding: Encoding, json: bool) -> Result<(), String> {
    let store = Store::open(Path::new(db))?;
    let report = run(&store, encoding.codec(), &CancelToken::new()).map_err(|e| e.to_string())?;
    if json {
        let line = serde_json::to_string(&report).map_err(|e| format!("encode report: {e}"))?;
        println!("{line}");
    } else {
        println!(
            "validated balance of {} wallets at block height {}",
            report.wallet_count, report.block_height
        );
    }
    Ok(())
}

fn cmd_stats(db: &str, encoding: Encoding, json: bool) -> Result<(), String> {
    let store = Store::open(Path::new(db))?;
    let key = StoreKey::Plain(STATS_KEY.to_string());
    let bytes = store
        .get(&key)
        .map_err(|e| format!("fetch stats: {e}"))?
        .ok_or_else(|| "no stats record in database".to_string())?;
    let stats = encoding.codec().decode_stats(&bytes)?;
    let unlocked = stats
        .unlocked_coins()
        .ok_or_else(|| "stats record claims more locked than total coins".to_string())?;
    if json {
        let line = serde_json::json!({
            "blockHeight": stats.block_height,
            "timestamp": stats.timestamp,
            "coins": stats.total_coins.to_string(),
            "lockedCoins": stats.locked_coins.to_string(),
            "unlockedCoins": unlocked.to_string(),
        });
        println!("{line}");
    } else {
        println!("block height {} (timestamp {})", stats.block_height, stats.timestamp);
        println!("total coins    {}", stats.total_coins);
        println!("locked coins   {}", stats.locked_coins);
        println!("unlocked coins {unlocked}");
    }
    Ok(())
}

fn cmd_seed(db: &str, encoding: Encoding, fixture_path: &str) -> Result<(), String> {
    let doc = fs::read_to_string(fixture_path).map_err(|e| format!("read fixture: {e}"))?;
    let fixture: Fixture =
        serde_json::from_str(&doc).map_err(|e| format!("parse fixture: {e}"))?;

    let json = Encoding::Json.codec();
    let codec = encoding.codec();
    let store = Store::open(Path::new(db))?;
    let batch = store.begin_write()?;

    let mut members: BTreeSet<&str> = fixture.addresses.iter().map(String::as_str).collect();
    members.extend(fixture.wallets.keys().map(String::as_str));
    for member in &members {
        batch.add_member(ADDRESSES_SET, member)?;
    }

    let mut wallet_count = 0u64;
    for (address, value) in &fixture.wallets {
        let raw = serde_json::to_vec(value).map_err(|e| format!("fixture wallet {address}: {e}"))?;
        let wallet = json
            .decode_wallet(&raw)
            .map_err(|e| format!("fixture wallet {address}: {e}"))?;
        batch.put(&wallet_store_key(address), &codec.encode_wallet(&wallet)?)?;
        wallet_count += 1;
    }

    if let Some(value) = &fixture.stats {
        let raw = serde_json::to_vec(value).map_err(|e| format!("fixture stats: {e}"))?;
        let stats = json
            .decode_stats(&raw)
            .map_err(|e| format!("fixture stats: {e}"))?;
        batch.put(&StoreKey::Plain(STATS_KEY.to_string()), &codec.encode_stats(&stats)?)?;
    }

    batch.commit()?;
    println!(
        "seeded {} addresses ({wallet_count} wallet records) as {encoding}",
        members.len()
    );
    Ok(())
}

// ─── argument plumbing ───────────────────────────────────────────────────────

fn get_flag(args: &[String], flag: &str) -> Result<Option<String>, String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            if i + 1 >= args.len() {
                return Err(format!("missing value for {flag}"));
            }
            return Ok(Some(args[i + 1].clone()));
        }
        i += 1;
    }
    Ok(None)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn required_flag(args: &[String], flag: &str) -> Result<String, i32> {
    match get_flag(args, flag) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => {
            eprintln!("missing required flag: {flag}");
            Err(2)
        }
        Err(e) => {
            eprintln!("{e}");
            Err(2)
        }
    }
}

fn encoding_flag(args: &[String]) -> Result<Encoding, i32> {
    let value = required_flag(args, "--encoding")?;
    value.parse::<Encoding>().map_err(|e| {
        eprintln!("--encoding: {e}");
        2
    })
}

fn cmd_version() -> i32 {
    println!("tally {}", env!("CARGO_PKG_VERSION"));
    0
}

fn cmd_verify_main(args: &[String]) -> i32 {
    let db = match required_flag(args, "--db") {
        Ok(v) => v,
        Err(code) => return code,
    };
    let encoding = match encoding_flag(args) {
        Ok(v) => v,
        Err(code) => return code,
    };
    if let Err(e) = cmd_verify(&db, encoding, has_flag(args, "--json")) {
        eprintln!("verify error: {e}");
        return 1;
    }
    0
}

fn cmd_stats_main(args: &[String]) -> i32 {
    let db = match required_flag(args, "--db") {
        Ok(v) => v,
        Err(code) => return code,
    };
    let encoding = match encoding_flag(args) {
        Ok(v) => v,
        Err(code) => return code,
    };
    if let Err(e) = cmd_stats(&db, encoding, has_flag(args, "--json")) {
        eprintln!("stats error: {e}");
        return 1;
    }
    0
}

fn cmd_seed_main(args: &[String]) -> i32 {
    let db = match required_flag(args, "--db") {
        Ok(v) => v,
        Err(code) => return code,
    };
    let encoding = match encoding_flag(args) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let fixture = match required_flag(args, "--fixture") {
        Ok(v) => v,
        Err(code) => return code,
    };
    if let Err(e) = cmd_seed(&db, encoding, &fixture) {
        eprintln!("seed error: {e}");
        return 1;
    }
    0
}

fn usage() {
    eprintln!("usage: tally <command> [args]");
    eprintln!("commands:");
    eprintln!("  version");
    eprintln!("  verify --db <path> --encoding <msgp|json|protobuf> [--json]");
    eprintln!("  stats --db <path> --encoding <msgp|json|protobuf> [--json]");
    eprintln!("  seed --db <path> --encoding <msgp|json|protobuf> --fixture <path>");
}

fn dispatch(cmd: &str, args: &[String]) -> i32 {
    match cmd {
        "version" => cmd_version(),
        "verify" => cmd_verify_main(args),
        "stats" => cmd_stats_main(args),
        "seed" => cmd_seed_main(args),
        _ => {
            eprintln!("unknown command: {cmd}");
            2
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        usage();
        std::process::exit(2);
    }
    let cmd = args.remove(0);
    let exit_code = dispatch(&cmd, &args);
    if exit_code != 0 {
        if exit_code == 2 {
            usage();
        }
        std::process::exit(exit_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_core::Amount;

    fn flags(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn get_flag_finds_value_pairs() {
        let args = flags(&["--db", "/tmp/x.redb", "--json"]);
        assert_eq!(get_flag(&args, "--db").unwrap().as_deref(), Some("/tmp/x.redb"));
        assert_eq!(get_flag(&args, "--encoding").unwrap(), None);
        assert!(has_flag(&args, "--json"));
        assert!(!has_flag(&args, "--quiet"));
    }

    #[test]
    fn get_flag_rejects_trailing_flag() {
        let args = flags(&["--db"]);
        assert!(get_flag(&args, "--db").is_err());
    }

    #[test]
    fn seed_then_verify_round_trip() {
        let fixture = r#"{
            "addresses": ["01referenced0000000000000000000000000000"],
            "wallets": {
                "01aafeed00000000000000000000000000000000": {
                    "balance": {
                        "unlocked": {"total": "70"},
                        "locked": {
                            "total": "30",
                            "outputs": {
                                "abc": {"amount": "30", "lockedUntil": 9000}
                            }
                        }
                    }
                },
                "01bbfeed00000000000000000000000000000000": {
                    "balance": {"unlocked": {"total": "25"}}
                }
            },
            "stats": {"blockHeight": 512, "timestamp": 1600000000, "coins": "125", "lockedCoins": "30"}
        }"#;
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture_path = dir.path().join("fixture.json");
        fs::write(&fixture_path, fixture).expect("write fixture");

        for encoding in [Encoding::MessagePack, Encoding::Json, Encoding::Protobuf] {
            let db = dir.path().join(format!("{encoding}.redb"));
            let db_str = db.to_str().expect("utf-8 path");
            cmd_seed(db_str, encoding, fixture_path.to_str().expect("utf-8 path"))
                .expect("seed");

            let store = Store::open(&db).expect("open");
            let report = run(&store, encoding.codec(), &CancelToken::new()).expect("run");
            assert_eq!(report.wallet_count, 2, "{encoding}");
            assert_eq!(report.block_height, 512);
            assert_eq!(report.sum_unlocked, Amount::from_u64(95));
            assert_eq!(report.sum_locked, Amount::from_u64(30));

            // The referenced-but-unpopulated address is a set member only.
            let members: Vec<_> = store
                .enumerate(ADDRESSES_SET)
                .expect("enumerate")
                .collect::<Result<_, _>>()
                .expect("members");
            assert_eq!(members.len(), 3);
        }
    }

    #[test]
    fn verify_fails_on_missing_stats() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("tally.redb");
        {
            let store = Store::open(&db).expect("open");
            let batch = store.begin_write().expect("begin");
            batch.commit().expect("commit");
        }
        let err = cmd_verify(db.to_str().expect("utf-8 path"), Encoding::Json, false)
            .expect_err("missing stats must fail");
        assert!(err.contains("stats"), "{err}");
    }
}
