//! Command-line interface for Findora.
//!
//! Provides subcommands for working with a Findora backend:
//! - `login` / `logout` / `whoami` - Manage the stored session
//! - `home`, `board`, `research`, `admission` - Browse posts
//! - `posts`, `comment`, `like`, `bookmark` - Read and write content
//! - `messages` - Direct messages and send quota
//! - `admin` - User list and quota grants (admins only)

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::config::Config;
use crate::error::ApiError;
use crate::hooks::BookmarkBackend;
use crate::messaging::MessageCenter;
use crate::models::{NewPost, Post, PostUpdate, RegisterRequest, User};
use crate::pages::{
    AdminPage, AdmissionBoard, BoardPage, CommentNode, HomePage, ListQuery, Page, PostDetailPage,
    ResearchPage, SortKey,
};
use crate::session::{FileStore, SessionStore};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "findora")]
#[command(author, version, about = "Client for the Findora community platform", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "findora.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Backend URL, overrides `api.base_url`
    #[arg(long, env = "FINDORA_API_URL")]
    pub api_url: Option<String>,

    /// Keep the session in memory only (nothing written to disk)
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        login_id: String,
        #[arg(long, env = "FINDORA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create an account
    Register {
        #[arg(long)]
        login_id: String,
        #[arg(long, env = "FINDORA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        email: String,
    },

    /// Check whether a login id or nickname is free
    #[command(subcommand)]
    Available(AvailableCommands),

    /// Email verification codes
    #[command(subcommand)]
    Email(EmailCommands),

    /// Newest posts and notices
    Home,

    /// List one board's posts
    Board {
        /// Category id
        category: i64,
        #[command(flatten)]
        list: ListArgs,
    },

    /// Post management commands
    #[command(subcommand)]
    Posts(PostsCommands),

    /// Comment on a post
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Toggle a like on a post or comment
    Like {
        post_id: i64,
        #[arg(long)]
        comment: Option<i64>,
    },

    /// Toggle a bookmark on a post
    Bookmark { post_id: i64 },

    /// List bookmarked posts
    Bookmarks,

    /// Research-lab evaluations
    Research {
        /// Show the reviews of one lab
        #[arg(long)]
        lab: Option<String>,
    },

    /// Admission board
    Admission {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Direct messages
    #[command(subcommand)]
    Messages(MessagesCommands),

    /// Admin commands
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive search over title, content and author
    #[arg(short, long)]
    pub search: Option<String>,
    /// newest, oldest, views or title
    #[arg(long, default_value = "newest")]
    pub sort: SortKey,
    #[arg(short, long, default_value = "1")]
    pub page: usize,
}

impl ListArgs {
    fn to_query(&self, page_size: usize) -> ListQuery {
        let query = ListQuery::new(page_size).with_sort(self.sort);
        let query = match &self.search {
            Some(search) => query.with_search(search.as_str()),
            None => query,
        };
        query.with_page(self.page)
    }
}

#[derive(Subcommand, Debug)]
pub enum AvailableCommands {
    LoginId { login_id: String },
    Nickname { nickname: String },
}

#[derive(Subcommand, Debug)]
pub enum EmailCommands {
    /// Send a verification code
    SendCode { email: String },
    /// Confirm a received code
    Verify { email: String, code: String },
}

#[derive(Subcommand, Debug)]
pub enum PostsCommands {
    /// Show a post with its comments
    Show { post_id: i64 },
    /// Write a new post
    Write {
        #[arg(long)]
        category: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Image files to attach
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Edit title and content
    Edit {
        post_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Replace a post's images
    Images {
        post_id: i64,
        /// Image files to add
        #[arg(long = "add")]
        add: Vec<PathBuf>,
        /// Existing image ids to keep
        #[arg(long = "keep")]
        keep: Vec<i64>,
    },
    /// Delete a post
    Delete { post_id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    Add {
        post_id: i64,
        content: String,
        /// Reply to this comment
        #[arg(long)]
        reply_to: Option<i64>,
    },
    Edit {
        post_id: i64,
        comment_id: i64,
        content: String,
    },
    Delete { post_id: i64, comment_id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommands {
    /// One line per conversation
    Threads,
    /// Show a conversation and mark it read
    Show { user_id: i64 },
    /// Send a message
    Send { user_id: i64, content: String },
    /// Mark a conversation read without showing it
    Read { user_id: i64 },
    /// Delete one message
    Delete { message_id: i64 },
    /// Remaining sends
    Quota,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// All users with their remaining message quota
    Users,
    /// Set a user's message quota
    Grant { user_id: i64, count: u32 },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file and print the effective settings
    Check,
}

// ============================================================================
// Client context
// ============================================================================

/// Everything a command needs: config, HTTP client and session
pub struct Context {
    pub config: Config,
    pub api: ApiClient,
    pub auth: AuthService,
}

impl Context {
    pub fn new(cli: &Cli, mut config: Config) -> Result<Self> {
        if let Some(url) = &cli.api_url {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }

        let session = if cli.ephemeral || config.session.ephemeral {
            SessionStore::in_memory()
        } else {
            let store = FileStore::open(&config.session.data_dir).with_context(|| {
                format!(
                    "Failed to open session store in {}",
                    config.session.data_dir.display()
                )
            })?;
            debug!("Session file: {}", store.path().display());
            SessionStore::new(Arc::new(store))
        };

        let api =
            ApiClient::new(&config.api, session.clone()).context("Failed to create HTTP client")?;
        let auth = AuthService::new(Arc::new(api.clone()), session);

        Ok(Self { config, api, auth })
    }

    /// Refresh the token if needed and return the signed-in user
    async fn require_user(&self) -> Result<User> {
        match self.auth.check_and_refresh_token().await {
            Ok(_) => {}
            Err(e) if e.is_auth() => bail!("Session expired. Run 'findora login' again."),
            Err(e) => return Err(e.into()),
        }
        match self.auth.current_user() {
            Some(user) => Ok(user),
            None => bail!("Not logged in. Run 'findora login' first."),
        }
    }

    /// Refresh the token when a session exists; anonymous is fine
    async fn optional_user(&self) -> Option<User> {
        if let Err(e) = self.auth.check_and_refresh_token().await {
            debug!("Continuing without a session: {}", e);
        }
        self.auth.current_user()
    }

    fn message_center(&self, me: &User) -> MessageCenter {
        let api = Arc::new(self.api.clone());
        MessageCenter::new(api.clone(), api, me.id, &self.config.messaging)
    }
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli, &config);
    }

    let ctx = Context::new(cli, config)?;

    match &cli.command {
        Commands::Login { login_id, password } => cmd_login(&ctx, login_id, password).await,
        Commands::Logout => cmd_logout(&ctx),
        Commands::Whoami => cmd_whoami(&ctx).await,
        Commands::Register {
            login_id,
            password,
            nickname,
            email,
        } => {
            let request = RegisterRequest {
                login_id: login_id.clone(),
                password: password.clone(),
                nickname: nickname.clone(),
                email: email.clone(),
            };
            ctx.auth.register(&request).await?;
            println!("[OK] Account '{}' created. You can now log in.", login_id);
            Ok(())
        }
        Commands::Available(cmd) => cmd_available(&ctx, cmd).await,
        Commands::Email(EmailCommands::SendCode { email }) => {
            ctx.auth.send_email_code(email).await?;
            println!("Verification code sent to {}", email);
            Ok(())
        }
        Commands::Email(EmailCommands::Verify { email, code }) => {
            ctx.auth.verify_email_code(email, code).await?;
            println!("[OK] {} verified", email);
            Ok(())
        }
        Commands::Home => cmd_home(&ctx).await,
        Commands::Board { category, list } => cmd_board(&ctx, *category, list).await,
        Commands::Posts(cmd) => cmd_posts(&ctx, cmd).await,
        Commands::Comment(cmd) => cmd_comment(&ctx, cmd).await,
        Commands::Like { post_id, comment } => cmd_like(&ctx, *post_id, *comment).await,
        Commands::Bookmark { post_id } => cmd_bookmark(&ctx, *post_id).await,
        Commands::Bookmarks => cmd_bookmarks(&ctx).await,
        Commands::Research { lab } => cmd_research(&ctx, lab.as_deref()).await,
        Commands::Admission { list } => cmd_admission(&ctx, list).await,
        Commands::Messages(cmd) => cmd_messages(&ctx, cmd).await,
        Commands::Admin(cmd) => cmd_admin(&ctx, cmd).await,
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

async fn cmd_login(ctx: &Context, login_id: &str, password: &str) -> Result<()> {
    let user = ctx.auth.login(login_id, password).await?;
    println!("[OK] Logged in as {} ({})", user.nickname, user.login_id);
    Ok(())
}

fn cmd_logout(ctx: &Context) -> Result<()> {
    ctx.auth.logout()?;
    println!("Logged out.");
    Ok(())
}

async fn cmd_whoami(ctx: &Context) -> Result<()> {
    ctx.require_user().await?;
    let user = ctx.auth.refresh_user().await?;

    println!();
    println!("ID:        {}", user.id);
    println!("Login ID:  {}", user.login_id);
    println!("Nickname:  {}", user.nickname);
    if !user.email.is_empty() {
        println!("Email:     {}", user.email);
    }
    println!("Role:      {}", user.role);
    println!();
    Ok(())
}

async fn cmd_available(ctx: &Context, cmd: &AvailableCommands) -> Result<()> {
    let (label, value, free) = match cmd {
        AvailableCommands::LoginId { login_id } => {
            ("Login ID", login_id, ctx.auth.check_login_id(login_id).await?)
        }
        AvailableCommands::Nickname { nickname } => {
            ("Nickname", nickname, ctx.auth.check_nickname(nickname).await?)
        }
    };
    if free {
        println!("[OK] {} '{}' is available", label, value);
    } else {
        println!("[!!] {} '{}' is already taken", label, value);
    }
    Ok(())
}

async fn cmd_home(ctx: &Context) -> Result<()> {
    let viewer = ctx.optional_user().await;
    let backend = Arc::new(ctx.api.clone());
    let mut home = HomePage::new(backend, &ctx.config.boards);

    let center = viewer.as_ref().map(|me| ctx.message_center(me));
    if let Some(center) = &center {
        if let Err(e) = center.refresh().await {
            debug!("Unread count unavailable: {}", e);
        }
        home = home.with_unread(center.unread_store());
    }

    home.load().await;
    if let Some(err) = home.error() {
        bail!("Failed to load posts: {}", err);
    }

    println!();
    match &viewer {
        Some(user) => println!("=== Findora === signed in as {}", user.nickname),
        None => println!("=== Findora ==="),
    }
    if let Some(unread) = home.unread_count() {
        println!("Unread messages: {}", unread);
    }

    let notices = home.notices();
    if !notices.is_empty() {
        println!();
        println!("Notices:");
        print_post_rows(&notices);
    }

    println!();
    println!("Recent posts:");
    print_post_rows(&home.recent_posts());
    println!();

    if let Some(center) = center {
        center.shutdown();
    }
    Ok(())
}

async fn cmd_board(ctx: &Context, category: i64, list: &ListArgs) -> Result<()> {
    ctx.optional_user().await;
    let page_size = ctx.config.boards.page_size;
    let mut board = BoardPage::new(Arc::new(ctx.api.clone()), category, page_size);
    board.set_query(list.to_query(page_size));
    board.load().await;
    if let Some(err) = board.error() {
        bail!("Failed to load board {}: {}", category, err);
    }

    print_page(&board.current());
    Ok(())
}

async fn cmd_posts(ctx: &Context, cmd: &PostsCommands) -> Result<()> {
    match cmd {
        PostsCommands::Show { post_id } => cmd_post_show(ctx, *post_id).await,
        PostsCommands::Write {
            category,
            title,
            content,
            images,
        } => {
            ctx.require_user().await?;
            crate::auth::validation::validate_post(title, content)?;
            let post = ctx
                .api
                .create_post(&NewPost {
                    category_id: *category,
                    title: title.trim().to_string(),
                    content: content.clone(),
                })
                .await?;
            println!("[OK] Post #{} created", post.id);

            if !images.is_empty() {
                let paths: Vec<&Path> = images.iter().map(PathBuf::as_path).collect();
                let uploaded = ctx.api.update_post_images(post.id, &paths, &[]).await?;
                println!("     {} image(s) attached", uploaded.len());
            }
            Ok(())
        }
        PostsCommands::Edit {
            post_id,
            title,
            content,
        } => {
            ctx.require_user().await?;
            crate::auth::validation::validate_post(title, content)?;
            let post = ctx
                .api
                .update_post(
                    *post_id,
                    &PostUpdate {
                        title: title.trim().to_string(),
                        content: content.clone(),
                    },
                )
                .await?;
            println!("[OK] Post #{} updated: {}", post.id, post.title);
            Ok(())
        }
        PostsCommands::Images { post_id, add, keep } => {
            ctx.require_user().await?;
            let paths: Vec<&Path> = add.iter().map(PathBuf::as_path).collect();
            let images = ctx.api.update_post_images(*post_id, &paths, keep).await?;
            println!("[OK] Post #{} now has {} image(s)", post_id, images.len());
            for image in images {
                println!("  #{:<6} {}", image.id, image.url);
            }
            Ok(())
        }
        PostsCommands::Delete { post_id } => {
            ctx.require_user().await?;
            ctx.api.delete_post(*post_id).await?;
            println!("[OK] Post #{} deleted", post_id);
            Ok(())
        }
    }
}

async fn cmd_post_show(ctx: &Context, post_id: i64) -> Result<()> {
    let viewer = ctx.optional_user().await;
    let api = Arc::new(ctx.api.clone());
    let mut page = PostDetailPage::new(api.clone(), api.clone(), api.clone(), post_id);
    if viewer.is_some() {
        page = page.with_bookmarks(api);
    }
    page.load().await;

    let Some(post) = page.post() else {
        bail!(
            "Failed to load post {}: {}",
            post_id,
            page.error().unwrap_or("not found")
        );
    };

    println!();
    println!("=== {} ===", post.title);
    println!();
    println!("Board:     {}", post.category.name);
    println!("Author:    {}", post.author_nickname);
    println!("Posted:    {}", format_time(&post.created_at));
    println!("Views:     {}", post.view_count);
    println!(
        "Likes:     {}{}",
        page.like().count(),
        if page.like().is_liked() { " (liked)" } else { "" }
    );
    if let Some(bookmark) = page.bookmark() {
        if bookmark.is_bookmarked() {
            println!("Bookmarked");
        }
    }
    println!();
    println!("{}", post.content);
    for image in &post.images {
        println!("[image #{}] {}", image.id, image.url);
    }

    let tree = page.comment_tree();
    println!();
    println!("Comments ({}):", page.comments().count());
    for node in &tree {
        print_comment(node, 1);
    }
    println!();
    Ok(())
}

async fn cmd_comment(ctx: &Context, cmd: &CommentCommands) -> Result<()> {
    ctx.require_user().await?;
    let api = Arc::new(ctx.api.clone());
    match cmd {
        CommentCommands::Add {
            post_id,
            content,
            reply_to,
        } => {
            let mut section = crate::hooks::CommentSection::new(api, *post_id);
            let comment = section.add(content, *reply_to).await?;
            println!("[OK] Comment #{} added", comment.id);
        }
        CommentCommands::Edit {
            post_id,
            comment_id,
            content,
        } => {
            let mut section = crate::hooks::CommentSection::new(api, *post_id);
            section.edit(*comment_id, content).await?;
            println!("[OK] Comment #{} updated", comment_id);
        }
        CommentCommands::Delete {
            post_id,
            comment_id,
        } => {
            let mut section = crate::hooks::CommentSection::new(api, *post_id);
            section.load().await;
            section.remove(*comment_id).await?;
            println!("[OK] Comment #{} deleted", comment_id);
        }
    }
    Ok(())
}

async fn cmd_like(ctx: &Context, post_id: i64, comment: Option<i64>) -> Result<()> {
    ctx.require_user().await?;
    let api = Arc::new(ctx.api.clone());
    let mut toggle = match comment {
        Some(comment_id) => crate::hooks::LikeToggle::for_comment(api, post_id, comment_id),
        None => crate::hooks::LikeToggle::for_post(api, post_id),
    };
    toggle.load().await?;
    let state = toggle.toggle().await?;
    println!(
        "{} ({} like{})",
        if state.liked { "Liked" } else { "Unliked" },
        state.count,
        if state.count == 1 { "" } else { "s" }
    );
    Ok(())
}

async fn cmd_bookmark(ctx: &Context, post_id: i64) -> Result<()> {
    ctx.require_user().await?;
    let mut toggle = crate::hooks::BookmarkToggle::new(Arc::new(ctx.api.clone()), post_id);
    toggle.load().await?;
    if toggle.toggle().await? {
        println!("[OK] Post #{} bookmarked", post_id);
    } else {
        println!("[OK] Bookmark on post #{} removed", post_id);
    }
    Ok(())
}

async fn cmd_bookmarks(ctx: &Context) -> Result<()> {
    ctx.require_user().await?;
    let bookmarks = ctx.api.list_bookmarks().await?;
    if bookmarks.is_empty() {
        println!("No bookmarks yet.");
        return Ok(());
    }

    println!();
    println!("{:<8}  {:<50}  {:<16}", "POST", "TITLE", "SAVED");
    println!("{}", "-".repeat(78));
    for bookmark in bookmarks {
        println!(
            "{:<8}  {:<50}  {:<16}",
            bookmark.post_id,
            truncate(&bookmark.post_title, 50),
            format_time(&bookmark.created_at)
        );
    }
    println!();
    Ok(())
}

async fn cmd_research(ctx: &Context, lab: Option<&str>) -> Result<()> {
    ctx.optional_user().await;
    let mut research = ResearchPage::new(Arc::new(ctx.api.clone()), &ctx.config.boards);
    research.load().await;
    if let Some(err) = research.board().error() {
        bail!("Failed to load research evaluations: {}", err);
    }

    if let Some(lab) = lab {
        let reviews = research.reviews_for(lab);
        if reviews.is_empty() {
            println!("No reviews for '{}'.", lab);
            return Ok(());
        }
        println!();
        println!("=== {} ({} review(s)) ===", lab, reviews.len());
        for post in reviews {
            println!();
            println!(
                "#{} by {} on {}",
                post.id,
                post.author_nickname,
                format_time(&post.created_at)
            );
            println!("{}", post.content);
        }
        println!();
        return Ok(());
    }

    let labs = research.labs();
    if labs.is_empty() {
        println!("No research-lab evaluations yet.");
        return Ok(());
    }
    println!();
    println!("{:<40}  {:>7}  {:>7}  {:<16}", "LAB", "REVIEWS", "VIEWS", "LATEST");
    println!("{}", "-".repeat(76));
    for lab in labs {
        println!(
            "{:<40}  {:>7}  {:>7}  {:<16}",
            truncate(&lab.lab, 40),
            lab.reviews,
            lab.total_views,
            format_time(&lab.latest)
        );
    }
    println!();
    Ok(())
}

async fn cmd_admission(ctx: &Context, list: &ListArgs) -> Result<()> {
    ctx.optional_user().await;
    let mut admission = AdmissionBoard::new(Arc::new(ctx.api.clone()), &ctx.config.boards);
    admission
        .board_mut()
        .set_query(list.to_query(ctx.config.boards.page_size));
    admission.load().await;
    if let Some(err) = admission.board().error() {
        bail!("Failed to load admission board: {}", err);
    }
    print_page(&admission.current());
    Ok(())
}

async fn cmd_messages(ctx: &Context, cmd: &MessagesCommands) -> Result<()> {
    let me = ctx.require_user().await?;
    let center = ctx.message_center(&me);

    let result = match cmd {
        MessagesCommands::Threads => {
            center.refresh().await?;
            print_threads(&center);
            Ok(())
        }
        MessagesCommands::Show { user_id } => {
            center.refresh().await?;
            let Some(thread) = center.thread(*user_id) else {
                bail!("No conversation with user {}", user_id);
            };
            println!();
            println!("=== Conversation with {} ===", thread.other_user.nickname);
            println!();
            for message in &thread.messages {
                let who = if message.sender_id == me.id {
                    "me"
                } else {
                    thread.other_user.nickname.as_str()
                };
                let marker = if message.is_unread_for(me.id) { "*" } else { " " };
                println!(
                    "{} [{}] {:<16} {}",
                    marker,
                    format_time(&message.sent_at),
                    truncate(who, 16),
                    message.content
                );
            }
            println!();
            let marked = center.mark_thread_read(*user_id).await?;
            if marked > 0 {
                println!("{} message(s) marked read", marked);
            }
            Ok(())
        }
        MessagesCommands::Send { user_id, content } => match center.send(*user_id, content).await {
            Ok(()) => {
                println!("[OK] Message sent to user {}", user_id);
                if let Some(left) = center.remaining_quota() {
                    println!("     {} send(s) remaining", left);
                }
                Ok(())
            }
            Err(ApiError::QuotaExhausted) => {
                bail!("You have no message sends remaining. Ask an admin for more.")
            }
            Err(e) => Err(e.into()),
        },
        MessagesCommands::Read { user_id } => {
            center.refresh().await?;
            let marked = center.mark_thread_read(*user_id).await?;
            println!("{} message(s) marked read", marked);
            Ok(())
        }
        MessagesCommands::Delete { message_id } => {
            center.delete_message(*message_id).await?;
            println!("[OK] Message #{} deleted", message_id);
            Ok(())
        }
        MessagesCommands::Quota => {
            let left = center.check_authority().await?;
            println!("{} message send(s) remaining", left);
            Ok(())
        }
    };

    center.shutdown();
    result
}

async fn cmd_admin(ctx: &Context, cmd: &AdminCommands) -> Result<()> {
    let me = ctx.require_user().await?;
    let mut page = AdminPage::new(Arc::new(ctx.api.clone()), Some(&me))?;

    match cmd {
        AdminCommands::Users => {
            page.load().await?;
            let rows = page.rows();
            println!();
            println!(
                "{:<8}  {:<20}  {:<20}  {:<8}  {:>8}",
                "ID", "LOGIN ID", "NICKNAME", "ROLE", "MESSAGES"
            );
            println!("{}", "-".repeat(72));
            for row in rows {
                println!(
                    "{:<8}  {:<20}  {:<20}  {:<8}  {:>8}",
                    row.user.id,
                    truncate(&row.user.login_id, 20),
                    truncate(&row.user.nickname, 20),
                    row.user.role.to_string(),
                    row.remaining_messages
                );
            }
            println!();
        }
        AdminCommands::Grant { user_id, count } => {
            let granted = page.grant(*user_id, *count).await?;
            println!("[OK] User {} can now send {} message(s)", user_id, granted);
        }
    }
    Ok(())
}

/// Validate configuration and print the effective values
fn cmd_config_check(cli: &Cli, config: &Config) -> Result<()> {
    println!();
    if cli.config.exists() {
        println!("[OK] {} is valid", cli.config.display());
    } else {
        println!("[--] {} not found, using defaults", cli.config.display());
    }
    println!();
    println!(
        "API URL:        {}",
        cli.api_url.as_deref().unwrap_or(&config.api.base_url)
    );
    println!("Timeout:        {}s", config.api.timeout_secs);
    if config.session.ephemeral || cli.ephemeral {
        println!("Session:        in memory");
    } else {
        println!("Session:        {}", config.session.data_dir.display());
    }
    println!(
        "Boards:         free={} research={} admission={} notice={}",
        config.boards.free, config.boards.research, config.boards.admission, config.boards.notice
    );
    println!(
        "Messaging:      debounce={}ms cache={} entries/{}s max_length={}",
        config.messaging.refresh_debounce_ms,
        config.messaging.nickname_cache_capacity,
        config.messaging.nickname_cache_ttl_secs,
        config.messaging.max_message_length
    );
    println!();
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn print_post_rows(posts: &[Post]) {
    if posts.is_empty() {
        println!("  (none)");
        return;
    }
    for post in posts {
        println!(
            "  #{:<6} {:<44}  {:<16}  {}",
            post.id,
            truncate(&post.title, 44),
            truncate(&post.author_nickname, 16),
            format_time(&post.created_at)
        );
    }
}

fn print_page(page: &Page<Post>) {
    if page.total_items == 0 {
        println!("No posts found.");
        return;
    }

    println!();
    println!(
        "{:<8}  {:<44}  {:<16}  {:>6}  {:<16}",
        "ID", "TITLE", "AUTHOR", "VIEWS", "POSTED"
    );
    println!("{}", "-".repeat(98));
    for post in &page.items {
        println!(
            "{:<8}  {:<44}  {:<16}  {:>6}  {:<16}",
            post.id,
            truncate(&post.title, 44),
            truncate(&post.author_nickname, 16),
            post.view_count,
            format_time(&post.created_at)
        );
    }
    println!();
    println!(
        "Page {}/{} ({} post(s))",
        page.page, page.total_pages, page.total_items
    );
    println!();
}

fn print_comment(node: &CommentNode, depth: usize) {
    let comment = &node.comment;
    println!(
        "{}#{} {} ({}): {}",
        "  ".repeat(depth),
        comment.id,
        comment.author_nickname.as_deref().unwrap_or("unknown"),
        format_time(&comment.created_at),
        comment.content
    );
    for reply in &node.replies {
        print_comment(reply, depth + 1);
    }
}

fn print_threads(center: &MessageCenter) {
    let threads = center.threads();
    if threads.is_empty() {
        println!("No messages yet.");
        return;
    }

    println!();
    println!(
        "{:<8}  {:<20}  {:>6}  {:<16}  {:<40}",
        "USER", "NICKNAME", "UNREAD", "LAST", "MESSAGE"
    );
    println!("{}", "-".repeat(98));
    for thread in threads.iter() {
        println!(
            "{:<8}  {:<20}  {:>6}  {:<16}  {:<40}",
            thread.id,
            truncate(&thread.other_user.nickname, 20),
            thread.unread_count,
            format_time(&thread.last_message.sent_at),
            truncate(&thread.last_message.content, 40)
        );
    }
    println!();
    println!("Unread: {}", center.unread_count());
    println!();
}

/// Format a timestamp in local time
fn format_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string to max characters with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
