use comfy_table::{presets::UTF8_FULL, Table};
use quizchain_core::{digest, salted_digest, AccountId, InstanceId, QuizNode, Result};

pub fn show_status(node: &QuizNode, instance: u64) -> Result<()> {
    let info = node.instance_info(InstanceId::new(instance))?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Handle".to_string(), info.id.to_string()]);
    table.add_row(vec!["Question".to_string(), info.question.clone()]);
    table.add_row(vec!["Stored digest".to_string(), info.answer.to_string()]);
    table.add_row(vec![
        "Winner".to_string(),
        info.winner
            .as_ref()
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec!["Prize pool".to_string(), info.prize_pool.to_string()]);
    table.add_row(vec!["Phase".to_string(), info.phase.to_string()]);

    println!("{}", table);
    Ok(())
}

pub fn list_instances(node: &QuizNode) -> Result<()> {
    let instances = node.instances();
    if instances.is_empty() {
        println!("No instances deployed yet");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Handle", "Phase", "Prize pool", "Winner"]);
    for info in instances {
        table.add_row(vec![
            info.id.to_string(),
            info.phase.to_string(),
            info.prize_pool.to_string(),
            info.winner
                .as_ref()
                .map(|w| w.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
    Ok(())
}

pub fn show_balance(node: &QuizNode, account: &str) -> Result<()> {
    let account = AccountId::new(account);
    println!("Balance for '{}': {}", account, node.balance_of(&account));
    Ok(())
}

pub fn show_hash(text: &str) -> Result<()> {
    let plain = digest(text.as_bytes());
    println!("digest:        {}", plain);
    println!("salted digest: {}", salted_digest(&plain));
    Ok(())
}

pub fn show_events(node: &QuizNode) -> Result<()> {
    let events = node.events();
    if events.is_empty() {
        println!("No events recorded yet");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Seq", "At", "Event"]);
    for record in events {
        table.add_row(vec![
            record.seq.to_string(),
            record.at.format("%Y-%m-%d %H:%M:%S").to_string(),
            serde_json::to_string(&record.event)?,
        ]);
    }

    println!("{}", table);
    Ok(())
}
