//! User-facing console banners. Diagnostics go through `tracing`; these are
//! the lines a person running the tool is meant to read.

use harvest_core::{CollectionResult, ErrorExt, HarvestConfig, StopReason};
use std::path::Path;

const RULE_WIDTH: usize = 60;

pub fn print_intro(config: &HarvestConfig) {
    println!("🚀 Reddit Data Collection - ToS Compliant Version");
    println!("📋 Collecting data for research/analysis purposes only\n");
    println!("🎯 Target: r/{}", config.community);
    println!("📊 Purpose: Analyzing post patterns and content themes");
    println!("⚖️  Compliance: Using official Reddit API, research use only");
    println!("⏱️  Method: Respectful rate-limited collection\n");
}

pub fn print_config_rejected(message: &str) {
    println!("❌ {}", message);
    println!("   Check CLIENT_ID and CLIENT_SECRET in harvest-core/src/config.rs and any harvest.toml");
}

pub fn print_collection_summary(result: &CollectionResult) {
    match &result.stop {
        StopReason::Fault(fault) => println!("❌ {}", fault.user_friendly_message()),
        StopReason::SafetyCap => println!("⚠️  Reached safety limit of {} posts", result.len()),
        StopReason::Exhausted | StopReason::LimitReached => {}
    }
    println!("🎉 Finished! Collected {} total posts", result.len());
}

pub fn print_saved(path: &Path, records: usize) {
    println!("💾 Saved {} posts to {}", records, path.display());
    println!("⚠️  IMPORTANT: Delete this data within 48 hours per Reddit's guidelines");
}

pub fn print_compliance_reminder() {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule);
    println!("🔒 REDDIT API COMPLIANCE REMINDER");
    println!("{}", rule);
    println!("✅ This data was collected using Reddit's official API");
    println!("✅ Collection respects rate limits and ToS");
    println!("⚠️  FOR RESEARCH/ANALYSIS USE ONLY (non-commercial)");
    println!("⚠️  DELETE THIS DATA WITHIN 48 HOURS");
    println!("⚠️  Do not redistribute raw Reddit data");
    println!("✅ Use insights/patterns, not raw posts, in any reports");
    println!("{}", rule);
}

pub fn print_nothing_collected() {
    println!("❌ No data collected. Check your credentials and subreddit name.");
}

pub fn print_ready(path: &Path) {
    println!("\n📁 Data saved to: {}", path.display());
    println!("📊 Ready for analysis - focus on insights, not raw content!");
}

pub fn print_error(message: &str) {
    println!("❌ {}", message);
}
