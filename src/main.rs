use std::thread;
use std::time::Duration;

use chain_ledger::config::Config;
use chain_ledger::{Block, Blockchain, Contract, Result, Transaction, Validator};
use dotenvy::dotenv;
use log::{error, info};

fn main() {
    let _ = dotenv();
    env_logger::init();

    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env()?;
    info!("starting with {config:?}");

    println!("⛓️ Building a chain at difficulty {}", config.difficulty);
    let mut chain = Blockchain::with_difficulty(config.difficulty);
    let options = config.mining_options();

    let contracts = vec![
        Contract::new("Smart Contract 1"),
        Contract::new("Smart Contract 2"),
    ];

    let transactions = vec![
        Transaction::new("Alice", "Bob", 5.0),
        Transaction::new("Bob", "Charlie", 2.5),
    ];
    let mut block = Block::new(transactions, contracts.clone(), chain.latest()?.hash.clone());
    block.mine_with(chain.difficulty(), &options)?;

    let verdict = Validator::new(&chain).validate(&block);
    match verdict {
        Ok(()) => {
            println!("Block validation successful.");
            chain.append(block);
        }
        Err(err) => println!("Block validation failed: {err}"),
    }

    println!("\nBlockchain:");
    print_chain(&chain);

    thread::sleep(Duration::from_secs(config.block_interval_secs));

    let transactions = vec![
        Transaction::new("Charlie", "David", 1.5),
        Transaction::new("David", "Eve", 3.0),
    ];
    let mut block = Block::new(transactions, contracts, chain.latest()?.hash.clone());
    block.mine_with(chain.difficulty(), &options)?;
    chain.append_if_valid(block)?;

    println!("\nUpdated Blockchain:");
    print_chain(&chain);

    println!("\nBlockchain (JSON):");
    println!("{}", chain.to_json()?);
    Ok(())
}

fn print_chain(chain: &Blockchain) {
    for block in chain.blocks() {
        println!("{block}\n");
    }
}
