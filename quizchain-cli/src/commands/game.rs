use quizchain_core::{
    digest, AccountId, Amount, Digest, GuessOutcome, InstanceId, QuizNode, QuizchainError, Result,
};

pub async fn init_instance(
    node: &QuizNode,
    instance: u64,
    from: &str,
    value: u64,
    answer: Option<String>,
    committed_hex: Option<String>,
) -> Result<()> {
    let committed = match (answer, committed_hex) {
        (Some(answer), None) => digest(answer.as_bytes()),
        (None, Some(hex)) => Digest::from_hex(&hex)?,
        _ => {
            return Err(QuizchainError::invalid_input(
                "provide exactly one of --answer or --digest",
            ))
        }
    };

    let instance = InstanceId::new(instance);
    let caller = AccountId::new(from);
    node.initialize(instance, &caller, committed, Amount::from_wei(value))
        .await?;

    println!("Instance {} initialized with a {} wei pool", instance, value);
    println!("Stored digest: {}", node.stored_digest(instance)?);
    Ok(())
}

pub async fn submit_guess(
    node: &QuizNode,
    instance: u64,
    from: &str,
    candidate: &str,
) -> Result<()> {
    let instance = InstanceId::new(instance);
    let caller = AccountId::new(from);

    match node
        .guess(instance, &caller, candidate, Amount::ZERO)
        .await?
    {
        GuessOutcome::Hit { prize } => {
            println!("Correct! {} wins {}", caller, prize);
            println!("New balance: {}", node.balance_of(&caller));
        }
        GuessOutcome::Miss => {
            println!("Wrong guess. The pool stays at {}", node.prize_pool(instance)?);
        }
    }

    Ok(())
}

pub async fn send_deposit(node: &QuizNode, instance: u64, from: &str, amount: u64) -> Result<()> {
    let instance = InstanceId::new(instance);
    let from = AccountId::new(from);
    node.send_to_instance(instance, &from, Amount::from_wei(amount))
        .await?;

    println!(
        "Deposited {} wei; instance {} pool is now {}",
        amount,
        instance,
        node.prize_pool(instance)?
    );
    Ok(())
}

pub async fn fund_account(node: &QuizNode, account: &str, amount: u64) -> Result<()> {
    let account = AccountId::new(account);
    node.fund(&account, Amount::from_wei(amount)).await?;

    println!("Funded {}; balance is now {}", account, node.balance_of(&account));
    Ok(())
}
