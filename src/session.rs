//! Game session: the one stateful object of the game.
//!
//! A [`Session`] owns the player, the scrolling obstacles and coins, the score
//! and the `Idle -> Running -> GameOver -> Running` state machine. It advances
//! by one fixed step per [`Session::update`] call (the host calls it once per
//! animation frame) and reports to the host only through [`HostHooks`].
//!
//! Coordinates are canvas pixels with y growing downward. The player's `y` is
//! the position of its feet, so "grounded" means `y == ground_line`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

use crate::config::GameConfig;
use crate::render::{DrawStyle, Surface, particle_color};

/// Seed used when neither the config nor the host supplies one.
const DEFAULT_SEED: u64 = 0x0D2A_60B5;

/// Particle squares are drawn at this fixed size.
const PARTICLE_SIZE: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    GameOver,
}

/// Sound effects the host may play; the session only names them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Jump,
    Coin,
}

/// Narrow notification interface the host supplies at construction.
pub trait HostHooks {
    /// Called from every `draw()` with the score being displayed.
    fn on_score_changed(&mut self, score: u64);
    /// Called exactly once per run, on the update that detects a collision.
    fn on_game_over(&mut self, final_score: u64);
    fn play_sound(&mut self, _cue: SoundCue) {}
}

/// Axis-aligned box, `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Strict overlap: touching edges do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f64,
    /// Feet position.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub velocity: f64,
    pub grounded: bool,
}

impl Player {
    fn resting(cfg: &GameConfig) -> Self {
        Self {
            x: cfg.player_x,
            y: cfg.ground_line(),
            width: cfg.player_width,
            height: cfg.player_height,
            velocity: 0.0,
            grounded: true,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y - self.height,
            w: self.width,
            h: self.height,
        }
    }
}

/// Ground hazard; it always stands on the ground line.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

impl Obstacle {
    pub fn bounds(&self, ground_line: f64) -> Rect {
        Rect {
            x: self.x,
            y: ground_line - self.height,
            w: self.width,
            h: self.height,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Coin {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Coin {
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.size,
            h: self.size,
        }
    }
}

/// Cosmetic spark; never influences the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    /// Remaining life in seconds, also used as alpha.
    pub life: f64,
    pub gold: bool,
}

pub struct Session<H: HostHooks> {
    config: GameConfig,
    hooks: H,
    rng: SmallRng,
    state: SessionState,
    style: DrawStyle,
    player: Player,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    particles: Vec<Particle>,
    score: u64,
    speed: f64,
}

impl<H: HostHooks> Session<H> {
    /// Build an idle session. Nothing moves until [`Session::start`].
    pub fn new(config: GameConfig, hooks: H) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        Self {
            player: Player::resting(&config),
            speed: config.scroll_speed,
            config,
            hooks,
            rng,
            state: SessionState::Idle,
            style: DrawStyle::default(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            particles: Vec::new(),
            score: 0,
        }
    }

    // --- Accessors -------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ground_line(&self) -> f64 {
        self.config.ground_line()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Theme / contrast only pick colors in `draw()`.
    pub fn set_style(&mut self, style: DrawStyle) {
        self.style = style;
    }

    // --- State machine ---------------------------------------------------------

    /// `Idle -> Running`. Use [`Session::restart`] to begin another run.
    pub fn start(&mut self) {
        if self.state != SessionState::Idle {
            log::warn!("start() ignored in state {:?}; use restart()", self.state);
            return;
        }
        self.reset();
        self.state = SessionState::Running;
        log::info!("session started");
    }

    /// Reset to the post-`start()` configuration from any state.
    pub fn restart(&mut self) {
        if self.state == SessionState::Running {
            log::debug!("restart() while running; discarding score {}", self.score);
        }
        self.reset();
        self.state = SessionState::Running;
        log::info!("session restarted");
    }

    /// Grounded jump. Airborne requests and calls outside `Running` do nothing.
    pub fn jump(&mut self) {
        if self.state != SessionState::Running || !self.player.grounded {
            return;
        }
        self.player.velocity = self.config.jump_impulse;
        self.player.grounded = false;
        let (fx, fy) = (self.player.x, self.player.y);
        self.burst(fx, fy, false);
        self.hooks.play_sound(SoundCue::Jump);
    }

    /// One fixed simulation step. Silent no-op unless `Running`.
    pub fn update(&mut self) {
        if self.state != SessionState::Running {
            return;
        }

        self.step_player();
        self.scroll_world();
        self.spawn_world();

        if self.player_hits_obstacle() {
            self.state = SessionState::GameOver;
            log::info!("game over with score {}", self.score);
            self.hooks.on_game_over(self.score);
            return;
        }

        self.collect_coins();
        self.score += self.config.score_per_frame;
        self.speed += self.config.speed_ramp;
    }

    /// Render the current state onto `surface`, then report the score.
    pub fn draw<S: Surface>(&mut self, surface: &mut S) {
        let palette = self.style.palette();
        let cfg = &self.config;
        let ground = cfg.ground_line();

        surface.fill_rect(0.0, 0.0, cfg.canvas_width, cfg.canvas_height, palette.background);
        surface.fill_rect(0.0, ground, cfg.canvas_width, cfg.canvas_height - ground, palette.ground);

        for o in &self.obstacles {
            let r = o.bounds(ground);
            surface.fill_rect(r.x, r.y, r.w, r.h, palette.obstacle);
        }
        for c in &self.coins {
            let half = c.size / 2.0;
            surface.fill_circle(c.x + half, c.y + half, half, palette.coin);
        }

        let p = self.player.bounds();
        surface.fill_rect(p.x, p.y, p.w, p.h, palette.player);

        for spark in &self.particles {
            let color = particle_color(spark.gold, spark.life);
            surface.fill_rect(spark.x, spark.y, PARTICLE_SIZE, PARTICLE_SIZE, &color);
        }

        self.hooks.on_score_changed(self.score);
    }

    // --- Update stages ---------------------------------------------------------

    fn reset(&mut self) {
        self.player = Player::resting(&self.config);
        self.obstacles.clear();
        self.coins.clear();
        self.particles.clear();
        self.score = 0;
        self.speed = self.config.scroll_speed;

        // Deterministic opening obstacle right at the edge.
        self.obstacles.push(Obstacle {
            x: self.config.canvas_width,
            width: self.config.obstacle_width,
            height: self.config.obstacle_min_height,
        });
        self.spawn_coin();
    }

    fn step_player(&mut self) {
        let ground = self.config.ground_line();
        let p = &mut self.player;
        p.velocity += self.config.gravity;
        p.y += p.velocity;

        if p.y >= ground {
            p.y = ground;
            p.velocity = 0.0;
            p.grounded = true;
        } else if p.y - p.height < 0.0 {
            // Ceiling: keep the whole box on screen and kill upward motion.
            p.y = p.height;
            p.velocity = p.velocity.max(0.0);
        }
    }

    fn scroll_world(&mut self) {
        let speed = self.speed;
        for o in &mut self.obstacles {
            o.x -= speed;
        }
        self.obstacles.retain(|o| o.x + o.width >= 0.0);

        for c in &mut self.coins {
            c.x -= speed;
        }
        self.coins.retain(|c| c.x + c.size >= 0.0);

        let (g, dt) = (self.config.particle_gravity, self.config.frame_dt);
        for spark in &mut self.particles {
            spark.x += spark.vel_x;
            spark.y += spark.vel_y;
            spark.vel_y += g;
            spark.life -= dt;
        }
        self.particles.retain(|s| s.life > 0.0);
    }

    fn spawn_world(&mut self) {
        let width = self.config.canvas_width;
        let obstacle_due = self
            .obstacles
            .last()
            .is_none_or(|o| o.x < width - self.config.obstacle_spawn_threshold);
        if obstacle_due {
            self.spawn_obstacle();
        }

        let coin_due = self
            .coins
            .last()
            .is_none_or(|c| c.x < width - self.config.coin_spawn_threshold);
        if coin_due {
            self.spawn_coin();
        }
    }

    fn spawn_obstacle(&mut self) {
        let x = self.config.canvas_width + sample(&mut self.rng, self.config.obstacle_gaps());
        let height = sample(&mut self.rng, self.config.obstacle_heights());
        log::debug!("obstacle spawned at x={x:.1} h={height:.1}");
        self.obstacles.push(Obstacle {
            x,
            width: self.config.obstacle_width,
            height,
        });
    }

    fn spawn_coin(&mut self) {
        let x = self.config.canvas_width + sample(&mut self.rng, self.config.coin_offsets());
        let y = sample(&mut self.rng, self.config.coin_heights());
        self.coins.push(Coin {
            x,
            y,
            size: self.config.coin_size,
        });
    }

    fn player_hits_obstacle(&self) -> bool {
        let ground = self.config.ground_line();
        let body = self.player.bounds();
        self.obstacles.iter().any(|o| body.overlaps(&o.bounds(ground)))
    }

    fn collect_coins(&mut self) {
        let body = self.player.bounds();
        let mut collected = Vec::new();
        self.coins.retain(|c| {
            if body.overlaps(&c.bounds()) {
                collected.push((c.x, c.y));
                false
            } else {
                true
            }
        });

        for (x, y) in collected {
            self.score += self.config.coin_bonus;
            self.burst(x, y, true);
            self.hooks.play_sound(SoundCue::Coin);
        }
    }

    fn burst(&mut self, x: f64, y: f64, gold: bool) {
        for _ in 0..self.config.particle_count {
            let vel_x = self.rng.gen_range(-3.0..=3.0);
            let vel_y = self.rng.gen_range(-5.0..=-1.0);
            self.particles.push(Particle {
                x,
                y,
                vel_x,
                vel_y,
                life: 1.0,
                gold,
            });
        }
    }
}

/// Uniform draw that tolerates degenerate (`lo == hi`) ranges.
fn sample(rng: &mut SmallRng, range: RangeInclusive<f64>) -> f64 {
    let (lo, hi) = range.into_inner();
    if hi <= lo { lo } else { rng.gen_range(lo..=hi) }
}
