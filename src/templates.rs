use maud::{DOCTYPE, Markup, html};

use crate::{models::ReviewWithMovie, stars};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const STAR_PATH: &str =
    "M12 .587l3.668 7.431L23.4 9.75l-5.7 5.56L18.9 24 12 19.897 5.1 24l1.2-8.69L.6 9.75l7.732-1.732z";

pub fn reviews_page(reviews: &[ReviewWithMovie]) -> String {
    page(
        "My Reviews",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    h1 class="text-3xl font-extrabold text-gray-900" { "My Reviews" }
                    p class="mt-2 text-sm text-gray-600" { "Films rated and reviewed." }

                    @if reviews.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No reviews yet." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for item in reviews {
                                (review_card(item))
                            }
                        }
                    }
                }
            }
        },
    )
}

fn review_card(item: &ReviewWithMovie) -> Markup {
    let movie = &item.movie;
    let review = &item.review;

    html! {
        div class="bg-white shadow rounded-lg p-6" {
            div class="flex items-start justify-between gap-4" {
                div {
                    h2 class="text-lg font-semibold text-gray-900" {
                        (movie.name)
                        @if let Some(year) = movie.release_year {
                            span class="ml-1 font-normal text-gray-500" { "(" (year) ")" }
                        }
                    }
                    @if !movie.director.is_empty() {
                        p class="text-sm text-gray-600" { "Directed by " (movie.director) }
                    }
                }
                @if let Some(url) = &movie.poster_url {
                    img class="h-20 rounded" src=(url) alt=(movie.name);
                }
            }

            div class="mt-3" { (star_row(review.rating as f32)) }

            @if let Some(comment) = &review.comment {
                p class="mt-3 text-gray-700" { (comment) }
            }
        }
    }
}

fn star_row(value: f32) -> Markup {
    html! {
        div class="flex gap-1" {
            @for index in 1..=stars::MAX_STARS {
                (star(stars::fill_percent(value, index)))
            }
        }
    }
}

fn star(fill: u8) -> Markup {
    html! {
        div class="relative h-5 w-5" {
            svg class="absolute inset-0 text-gray-300" viewBox="0 0 24 24" width="20" height="20" {
                path fill="none" stroke="currentColor" stroke-width="1.2" d=(STAR_PATH) {}
            }
            div class="absolute inset-y-0 left-0 overflow-hidden" style=(format!("width: {fill}%")) {
                svg class="text-yellow-400" viewBox="0 0 24 24" width="20" height="20" {
                    path fill="currentColor" d=(STAR_PATH) {}
                }
            }
        }
    }
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}
