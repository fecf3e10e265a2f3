//! End-to-end runs of the engine over a seeded redb database.

use tally_core::{
    run, wallet_store_key, Amount, CancelToken, ChainStats, Codec, Encoding, ReconError, StoreKey,
    WalletBalance, ADDRESSES_SET, STATS_KEY,
};

use crate::db::Store;
use crate::mem::MemSource;

fn addr(i: usize) -> String {
    format!("01fe{i:074x}")
}

fn seed(store: &Store, encoding: Encoding, wallets: &[(String, WalletBalance)], stats: &ChainStats) {
    let codec = encoding.codec();
    let batch = store.begin_write().expect("begin_write");
    for (address, wallet) in wallets {
        batch.add_member(ADDRESSES_SET, address).expect("member");
        let bytes = codec.encode_wallet(wallet).expect("encode wallet");
        batch.put(&wallet_store_key(address), &bytes).expect("put");
    }
    let bytes = codec.encode_stats(stats).expect("encode stats");
    batch
        .put(&StoreKey::Plain(STATS_KEY.to_string()), &bytes)
        .expect("put stats");
    batch.commit().expect("commit");
}

#[test]
fn full_run_over_redb() {
    for encoding in [Encoding::MessagePack, Encoding::Json, Encoding::Protobuf] {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(&dir.path().join("tally.redb")).expect("open");

        let mut wallets = Vec::new();
        for i in 0..4 {
            let mut wallet = WalletBalance::default();
            wallet.unlocked.total = Amount::from_u64(25);
            wallets.push((addr(i), wallet));
        }
        let stats = ChainStats {
            block_height: 77,
            timestamp: 1_600_000_000,
            total_coins: Amount::from_u64(100),
            locked_coins: Amount::zero(),
        };
        seed(&store, encoding, &wallets, &stats);

        let report = run(&store, encoding.codec(), &CancelToken::new()).expect("run");
        assert_eq!(report.wallet_count, 4, "{encoding}");
        assert_eq!(report.block_height, 77);
        assert_eq!(report.sum_unlocked, Amount::from_u64(100));
        assert_eq!(report.sum_locked, Amount::zero());
    }
}

#[test]
fn member_without_value_contributes_nothing() {
    let encoding = Encoding::MessagePack;
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(&dir.path().join("tally.redb")).expect("open");

    let mut wallet = WalletBalance::default();
    wallet.unlocked.total = Amount::from_u64(10);
    let stats = ChainStats {
        block_height: 1,
        timestamp: 0,
        total_coins: Amount::from_u64(10),
        locked_coins: Amount::zero(),
    };
    seed(&store, encoding, &[(addr(0), wallet)], &stats);

    // Extra member with no stored wallet record.
    let batch = store.begin_write().expect("begin_write");
    batch.add_member(ADDRESSES_SET, &addr(1)).expect("member");
    batch.commit().expect("commit");

    let report = run(&store, encoding.codec(), &CancelToken::new()).expect("run");
    assert_eq!(report.wallet_count, 1);
    assert_eq!(report.sum_unlocked, Amount::from_u64(10));
}

#[test]
fn mem_source_timeout_surfaces_through_the_engine() {
    let encoding = Encoding::Json;
    let codec = encoding.codec();
    let mut source = MemSource::new();

    let address = addr(7);
    let mut wallet = WalletBalance::default();
    wallet.unlocked.total = Amount::from_u64(5);
    source.add_member(ADDRESSES_SET, &address);
    source.put(
        wallet_store_key(&address),
        codec.encode_wallet(&wallet).expect("encode"),
    );
    let stats = ChainStats {
        block_height: 2,
        timestamp: 0,
        total_coins: Amount::from_u64(5),
        locked_coins: Amount::zero(),
    };
    source.put(
        StoreKey::Plain(STATS_KEY.to_string()),
        codec.encode_stats(&stats).expect("encode"),
    );

    let report = run(&source, codec, &CancelToken::new()).expect("run");
    assert_eq!(report.wallet_count, 1);

    source.time_out(wallet_store_key(&address));
    let err = run(&source, codec, &CancelToken::new()).unwrap_err();
    assert_eq!(err, ReconError::FetchTimeout { key: address });
}
