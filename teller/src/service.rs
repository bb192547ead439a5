use std::sync::Mutex;

use plotland::{
    assess, roll_steps, Board, Effect, Notice, Ownership, Payee, Player, PlayerId, PlayerStatus,
    Position, Reply, SellOffer, Settlement, Turn, TURN_BONUS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::error::ActionError;
use crate::liquidation::{liquidate, SaleEvent};
use crate::notify::Notify;
use crate::store::{Store, StoreError};

/// The turn orchestrator: one synchronous operation per action kind,
/// executed against the store.
///
/// Methods take `&self`; cross-player races are resolved inside the
/// store (atomic bank counter, conditional ownership writes), and the
/// dice sit behind a mutex.
pub struct GameService<S> {
    config: GameConfig,
    store: S,
    notify: Box<dyn Notify>,
    rng: Mutex<StdRng>,
}

impl<S: Store> GameService<S> {
    pub fn new(config: GameConfig, store: S, notify: Box<dyn Notify>) -> Self {
        Self::with_rng(config, store, notify, StdRng::seed_from_u64(rand::random()))
    }

    pub fn with_rng(config: GameConfig, store: S, notify: Box<dyn Notify>, rng: StdRng) -> Self {
        Self {
            config,
            store,
            notify,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the player record from the configured defaults, or
    /// restate the current position if the player already joined.
    pub fn start_game(&self, id: &PlayerId, name: &str) -> Result<Reply, ActionError> {
        if let Some(existing) = self.store.player(id)? {
            if existing.is_active() {
                return Ok(Reply::plain(format!(
                    "You are already in the game, {}! You are at {} facing {}, with {} coins \
                     after {} turns. Take a turn to roll the dice.",
                    existing.name,
                    existing.position,
                    existing.heading,
                    existing.wallet,
                    existing.turns_played
                )));
            }
        }

        let player = Player {
            id: id.clone(),
            name: name.to_string(),
            position: self.config.initial_position,
            heading: self.config.initial_heading,
            wallet: self.config.initial_wallet,
            turns_played: 0,
            skip_next_turn: false,
            status: PlayerStatus::Playing,
        };
        self.store.put_player(&player)?;
        debug!(player = %id, "new player joined");

        Ok(Reply::plain(format!(
            "Welcome to the game, {}! You start at {} facing {}, with {} coins. \
             Take a turn to roll the dice.",
            name, player.position, player.heading, player.wallet
        )))
    }

    /// Roll the dice and play one full turn.
    pub fn take_turn(&self, id: &PlayerId) -> Result<Reply, ActionError> {
        let (steps, turn) = {
            let mut rng = self.rng.lock().unwrap();
            (roll_steps(&mut *rng), Turn::roll(&mut *rng))
        };
        self.take_turn_with(id, steps, turn)
    }

    /// Play one turn with a fixed roll. This is the whole turn minus
    /// the dice, for tests and replays.
    pub fn take_turn_with(&self, id: &PlayerId, steps: i32, turn: Turn) -> Result<Reply, ActionError> {
        let mut player = self.active_player(id)?;

        if player.skip_next_turn {
            player.skip_next_turn = false;
            self.store.put_player(&player)?;
            return Ok(Reply::plain(format!(
                "You sit this turn out because of the last cell's effect! You are still at {} \
                 facing {}, with {} coins after {} turns.",
                player.position, player.heading, player.wallet, player.turns_played
            )));
        }

        player.heading = player.heading.turned(turn);
        player.position = player
            .position
            .advanced(player.heading, steps, self.config.board_size);
        let landed = player.position;

        let board = self.board()?;
        let cell = board
            .cell(landed)
            .cloned()
            .ok_or(ActionError::CellNotFound { position: landed })?;
        let owner_name = self.owner_display(&cell.owner)?;

        let mut lines = vec![format!("You rolled {} and turned {}.", steps, turn.label())];
        let mut notices = Vec::new();

        match assess(&board, &cell, id) {
            Settlement::SelfOwned => {
                lines.push(format!(
                    "You landed on your own plot {}. No landing fee!",
                    landed
                ));
            }
            Settlement::Free { tax: true } => {
                lines.push("You walked into the tax office!".to_string());
                lines.push("You own no taxable plots, so no tax is due.".to_string());
            }
            Settlement::Free { tax: false } => {
                lines.push(format!(
                    "You landed on {}. Neutral ground, nothing to pay.",
                    landed
                ));
            }
            Settlement::Charge { amount, payee, tax } => {
                if tax {
                    lines.push("You walked into the tax office!".to_string());
                    lines.push(format!(
                        "Your holdings add up to a tax bill of {} coins.",
                        amount
                    ));
                }

                if amount > 0 && player.wallet < amount {
                    lines.push(format!(
                        "Not enough coins to cover the {} coin charge. Your plots go up \
                         for forced sale...",
                        amount
                    ));
                    let outcome = {
                        let mut rng = self.rng.lock().unwrap();
                        liquidate(&self.store, &mut *rng, id, player.wallet, amount)?
                    };
                    let mut sold = Vec::new();
                    for event in &outcome.events {
                        match event {
                            SaleEvent::Sold { position, price } => {
                                lines.push(format!(
                                    "Sold your plot {} for {} coins, paid out by the bank.",
                                    position, price
                                ));
                                sold.push(position.to_string());
                            }
                            SaleEvent::Failed { position } => {
                                lines.push(format!(
                                    "The sale of plot {} failed because the bank could not \
                                     process it.",
                                    position
                                ));
                            }
                        }
                    }
                    if !sold.is_empty() {
                        notices.push(Notice::Broadcast {
                            except: id.clone(),
                            text: format!(
                                "{} was forced to sell these plots to stay in the game: {}. \
                                 They can be bought again!",
                                player.name,
                                sold.join(", ")
                            ),
                        });
                    }
                    player.wallet = outcome.wallet;

                    if !outcome.covered {
                        lines.push(format!(
                            "GAME OVER! You cannot pay the {} coin charge with {} coins. \
                             You are out of the game.",
                            amount, player.wallet
                        ));
                        notices.push(Notice::Broadcast {
                            except: id.clone(),
                            text: format!(
                                "☠ {} went bankrupt and is out of the game!",
                                player.name
                            ),
                        });
                        self.store.delete_player(id)?;
                        return Ok(self.finish(Reply {
                            message: lines.join("\n"),
                            notices,
                        }));
                    }
                }

                player.wallet -= amount;
                match payee {
                    Payee::Owner(owner_id) => match self.store.player(&owner_id)? {
                        Some(mut owner) => {
                            owner.wallet += amount;
                            self.store.put_player(&owner)?;
                            if amount > 0 {
                                if tax {
                                    lines.push(format!("You paid the {} coin tax.", amount));
                                } else {
                                    lines.push(format!(
                                        "You landed on {}, owned by {}. You paid {} coins \
                                         for landing.",
                                        landed, owner.name, amount
                                    ));
                                }
                                lines.push(format!("{} received {} coins.", owner.name, amount));
                                notices.push(Notice::Direct {
                                    player: owner_id.clone(),
                                    text: format!(
                                        "💰 Payment received! {} landed on your plot {} and \
                                         paid {} coins. Your new balance is {} coins.",
                                        player.name, landed, amount, owner.wallet
                                    ),
                                });
                            } else {
                                lines.push(format!(
                                    "You landed on {} and received a bonus of {} coins!",
                                    landed, -amount
                                ));
                            }
                        }
                        // The owning player left the game; their rent
                        // goes to the bank like state land.
                        None => self.pay_bank(&mut lines, landed, amount, tax)?,
                    },
                    Payee::Bank => self.pay_bank(&mut lines, landed, amount, tax)?,
                }
            }
        }

        // Special effects never fire on the tax-office path.
        let mut effect_note = None;
        if let Some(effect) = cell.effect() {
            if effect != Effect::TaxOffice {
                lines.push(cell.message.clone());
                effect_note = Some(cell.message.clone());
                let outcome = effect.apply(player.position, player.heading, self.config.board_size);
                if outcome.position != player.position {
                    player.position = outcome.position;
                    lines.push(format!("You were sent back to {}.", player.position));
                }
                if outcome.skip_next_turn {
                    player.skip_next_turn = true;
                }
            }
        }

        player.turns_played += 1;
        let bonus = player.bonus_due();
        if bonus {
            player.wallet += TURN_BONUS;
            lines.push(format!(
                "🎁 That was your turn number {}, so you earn a bonus of {} coins!",
                player.turns_played, TURN_BONUS
            ));
        }

        lines.push(self.cell_info(landed, &cell, &owner_name));
        lines.push(format!(
            "You are now at {} facing {}, with {} coins. You have played {} turns.",
            player.position, player.heading, player.wallet, player.turns_played
        ));

        self.store.put_player(&player)?;

        let mut broadcast = format!("📢 {} moved to {}!", player.name, player.position);
        if let Some(note) = effect_note.filter(|note| !note.is_empty()) {
            broadcast.push_str(&format!(" ({})", note));
        }
        if bonus {
            broadcast.push_str(&format!(
                " (Turn {} - {} earned the bonus!)",
                player.turns_played, player.name
            ));
        }
        notices.push(Notice::Broadcast {
            except: id.clone(),
            text: broadcast,
        });

        Ok(self.finish(Reply {
            message: lines.join("\n"),
            notices,
        }))
    }

    /// Buy the plot the player is standing on.
    pub fn buy_current_cell(&self, id: &PlayerId) -> Result<Reply, ActionError> {
        let mut player = self.active_player(id)?;
        let position = player.position;
        let board = self.board()?;
        let cell = board
            .cell(position)
            .cloned()
            .ok_or(ActionError::CellNotFound { position })?;

        if !cell.sellable() {
            return Err(ActionError::NotPurchasable { position });
        }
        match &cell.owner {
            Ownership::Player(owner) if owner == id => {
                return Err(ActionError::AlreadyOwned { position });
            }
            Ownership::Player(_) => {
                return Err(ActionError::OwnedByOther {
                    position,
                    owner: self.owner_display(&cell.owner)?,
                });
            }
            Ownership::State => {}
        }
        if player.wallet < cell.purchase_price {
            return Err(ActionError::InsufficientFunds {
                required: cell.purchase_price,
                wallet: player.wallet,
            });
        }

        let bonus = board.adjacency_bonus(position, id);
        let new_land_cost = cell.land_cost + bonus;

        // Reserve ownership before any money moves, so two buyers
        // racing for the same plot cannot both pay.
        match self.store.update_cell(
            position,
            &Ownership::State,
            Ownership::Player(id.clone()),
            Some(new_land_cost),
        ) {
            Ok(()) => {}
            Err(StoreError::OwnershipConflict { .. }) => {
                return Err(ActionError::OwnedByOther {
                    position,
                    owner: "another player".to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        }

        let balance = match self.store.adjust_bank(cell.purchase_price) {
            Ok(balance) => balance,
            Err(err) => {
                // The buyer never paid, so the reserve must not stand.
                if let Err(revert_err) = self.store.update_cell(
                    position,
                    &Ownership::Player(id.clone()),
                    Ownership::State,
                    Some(cell.land_cost),
                ) {
                    warn!(%revert_err, "failed releasing a reserved plot after a bank fault");
                }
                return Err(err.into());
            }
        };
        debug!(balance, price = cell.purchase_price, "purchase price paid into the bank");
        player.wallet -= cell.purchase_price;
        self.store.put_player(&player)?;

        let mut message = format!(
            "Congratulations! You bought plot {} for {} coins. The money went to the bank. \
             Your balance: {} coins.",
            position, cell.purchase_price, player.wallet
        );
        if bonus > 0 {
            message.push_str(&format!(
                "\n💰 Owning neighboring plots raises the landing fee here to {} coins \
                 (+{} adjacency bonus)!",
                new_land_cost, bonus
            ));
        }
        let notices = vec![Notice::Broadcast {
            except: id.clone(),
            text: format!("🎉 {} bought plot {}!", player.name, position),
        }];
        Ok(self.finish(Reply { message, notices }))
    }

    /// The player's plots that could be sold right now, with what the
    /// bank would pay for each.
    pub fn list_sellable_cells(&self, id: &PlayerId) -> Result<Vec<SellOffer>, ActionError> {
        self.active_player(id)?;
        let board = self.board()?;
        Ok(board
            .sellable_by(id)
            .map(|(position, cell)| SellOffer {
                position,
                estimated_price: cell.sale_value(),
            })
            .collect())
    }

    /// Sell one owned plot back to the state, funded by the bank.
    pub fn sell_cell(&self, id: &PlayerId, position: Position) -> Result<Reply, ActionError> {
        let mut player = self.active_player(id)?;
        let cell = self
            .store
            .cell(position)?
            .ok_or(ActionError::CellNotFound { position })?;

        if !cell.owner.is(id) {
            return Err(ActionError::OwnedByOther {
                position,
                owner: self.owner_display(&cell.owner)?,
            });
        }
        if !cell.sellable() {
            return Err(ActionError::NotPurchasable { position });
        }

        let price = cell.sale_value();
        // Debit the bank first; if that fails, nothing has changed.
        let balance = self
            .store
            .adjust_bank(-price)
            .map_err(|_| ActionError::BankTransactionFailed)?;
        debug!(balance, price, "bank funded a sale buy-back");

        match self.store.update_cell(
            position,
            &Ownership::Player(id.clone()),
            Ownership::State,
            None,
        ) {
            Ok(()) => {}
            Err(err) => {
                // The plot changed hands after the debit (e.g. a
                // concurrent sale of the same plot). Put the money back.
                if let Err(refund_err) = self.store.adjust_bank(price) {
                    warn!(%refund_err, "failed refunding the bank after a sale conflict");
                }
                return Err(match err {
                    StoreError::OwnershipConflict { .. } => ActionError::OwnedByOther {
                        position,
                        owner: "someone else".to_string(),
                    },
                    other => other.into(),
                });
            }
        }

        player.wallet += price;
        self.store.put_player(&player)?;

        let message = format!(
            "You sold plot {} for {} coins, paid out by the bank. Your balance: {} coins. \
             The plot belongs to the State again.",
            position, price, player.wallet
        );
        let notices = vec![Notice::Broadcast {
            except: id.clone(),
            text: format!("📣 {} sold plot {}! It can be bought again!", player.name, position),
        }];
        Ok(self.finish(Reply { message, notices }))
    }

    fn active_player(&self, id: &PlayerId) -> Result<Player, ActionError> {
        match self.store.player(id)? {
            Some(player) if player.is_active() => Ok(player),
            _ => Err(ActionError::NotInGame),
        }
    }

    fn board(&self) -> Result<Board, ActionError> {
        Ok(Board::new(self.config.board_size, self.store.cells()?))
    }

    fn owner_display(&self, owner: &Ownership) -> Result<String, ActionError> {
        Ok(match owner {
            Ownership::State => "the State".to_string(),
            Ownership::Player(id) => match self.store.player(id)? {
                Some(player) => player.name,
                None => "the State".to_string(),
            },
        })
    }

    fn pay_bank(
        &self,
        lines: &mut Vec<String>,
        landed: Position,
        amount: i64,
        tax: bool,
    ) -> Result<(), ActionError> {
        let balance = self.store.adjust_bank(amount)?;
        debug!(balance, amount, "settlement applied to the bank");
        if amount > 0 {
            if tax {
                lines.push(format!(
                    "You paid the {} coin tax. The money went to the bank.",
                    amount
                ));
            } else {
                lines.push(format!(
                    "You landed on {}. You paid {} coins, which went to the bank.",
                    landed, amount
                ));
            }
        } else {
            lines.push(format!(
                "You landed on {} and received a bonus of {} coins from the bank!",
                landed, -amount
            ));
        }
        Ok(())
    }

    fn cell_info(&self, position: Position, cell: &plotland::Cell, owner_name: &str) -> String {
        let mut info = format!("📊 About cell {}:", position);
        info.push_str(&format!("\n • Owner: {}.", owner_name));
        if cell.land_cost > 0 {
            info.push_str(&format!("\n • Landing fee: {} coins.", cell.land_cost));
        } else {
            info.push_str("\n • Landing here is free.");
        }
        if cell.owner == Ownership::State {
            if cell.purchase_price > 0 {
                info.push_str(&format!(
                    "\n • Purchase price: {} coins.",
                    cell.purchase_price
                ));
            } else {
                info.push_str("\n • This cell is not for sale.");
            }
        }
        info
    }

    /// Deliver the reply's notices best-effort. Failures are logged
    /// and dropped; the action result never depends on delivery.
    fn finish(&self, reply: Reply) -> Reply {
        let players = match self.store.players() {
            Ok(players) => players,
            Err(err) => {
                warn!(%err, "skipping notification fan-out");
                return reply;
            }
        };
        for notice in &reply.notices {
            match notice {
                Notice::Direct { player, text } => {
                    if let Err(err) = self.notify.deliver(player, text) {
                        warn!(player = %player, %err, "failed to deliver a direct notice");
                    }
                }
                Notice::Broadcast { except, text } => {
                    for (id, player) in &players {
                        if id != except && player.is_active() {
                            if let Err(err) = self.notify.deliver(id, text) {
                                warn!(player = %id, %err, "failed to deliver a broadcast");
                            }
                        }
                    }
                }
            }
        }
        reply
    }
}
