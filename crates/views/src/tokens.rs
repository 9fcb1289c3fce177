use crate::context::ViewContext;
use crate::render::{error_line, first_of, heading, pager, push_line, push_table, table, toned, truncate};
use crate::state::ListState;
use core_types::{Paginated, Token, TokenFilters};
use formatting::Tone;
use query_cache::{QueryKey, QueryState};

const ADDRESS_HEAD: usize = 10;
const ADDRESS_TAIL: usize = 8;
const VISIBLE_TAGS: usize = 3;
const NOTES_LIMIT: usize = 100;

pub struct TokensData {
    pub list: ListState<TokenFilters>,
    pub tokens: QueryState<Paginated<Token>>,
}

pub fn initial_state(ctx: &ViewContext) -> ListState<TokenFilters> {
    ListState::new(ctx.pagination().tokens_page_size, TokenFilters::default())
}

pub async fn load(
    ctx: &ViewContext,
    list: &ListState<TokenFilters>,
    previous: Option<&QueryState<Paginated<Token>>>,
) -> TokensData {
    let (page, page_size) = (list.page(), list.page_size());
    let filters = list.filters().clone();
    let key = QueryKey::new("tokens").with(&page).with(&page_size).with(&filters);

    let tokens = ctx
        .query(key, ctx.refresh().tokens_secs, move |api| async move {
            api.tokens(page, page_size, &filters).await
        })
        .await;

    TokensData {
        list: list.clone(),
        tokens: match previous {
            Some(previous) => tokens.or_previous(previous),
            None => tokens,
        },
    }
}

pub fn render(data: &TokensData) -> String {
    let mut out = String::new();
    heading(&mut out, "Tokens");
    if let Some(message) = &data.tokens.error {
        push_line(&mut out, error_line("tokens", message));
    }
    let Some(page) = data.tokens.data() else {
        if data.tokens.is_loading {
            push_line(&mut out, "Loading...");
        }
        return out;
    };

    heading(&mut out, &format!("Tokens ({})", page.total));
    if page.items.is_empty() {
        push_line(&mut out, "No tokens match the current filters");
    } else {
        push_table(&mut out, &token_table(&page.items));
    }
    if let Some(pager) = pager(page, data.list.page()) {
        push_line(&mut out, pager);
    }
    out
}

pub(crate) fn token_table(tokens: &[Token]) -> comfy_table::Table {
    let mut t = table(&["Symbol", "Name", "Status", "Chain", "Address", "Tags", "Notes"]);
    for token in tokens {
        t.add_row(vec![
            comfy_table::Cell::new(&token.symbol),
            comfy_table::Cell::new(&token.name),
            if token.is_active {
                toned("Active", Tone::Positive)
            } else {
                toned("Inactive", Tone::Neutral)
            },
            comfy_table::Cell::new(token.chain.as_str().to_uppercase()),
            comfy_table::Cell::new(token.address.as_deref().map(short_address).unwrap_or_default()),
            comfy_table::Cell::new(first_of(&token.tags, VISIBLE_TAGS, false)),
            comfy_table::Cell::new(truncate(&token.notes, NOTES_LIMIT)),
        ]);
    }
    t
}

/// `0x12345678...9abcdef0`: the first 10 and last 8 characters. Addresses too
/// short to shorten are shown whole.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= ADDRESS_HEAD + ADDRESS_TAIL {
        return address.to_string();
    }
    let head: String = chars[..ADDRESS_HEAD].iter().collect();
    let tail: String = chars[chars.len() - ADDRESS_TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}
