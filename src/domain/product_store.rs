//! Ordered, deduplicated product collection
//!
//! Products arriving from a poll are appended after the existing entries,
//! while products inserted locally are prepended. No two entries ever share a
//! `code`; on conflict the entry seen first is kept untouched.

use std::collections::HashSet;

use super::product::Product;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductStore {
    products: Vec<Product>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an arbitrary list, dropping later duplicates.
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut store = Self::new();
        store.append_new(products);
        store
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.products.iter().any(|p| p.code == code)
    }

    pub fn codes(&self) -> HashSet<&str> {
        self.products.iter().map(|p| p.code.as_str()).collect()
    }

    /// Keep only incoming products whose code is not in the store yet.
    ///
    /// Duplicates inside `incoming` collapse onto their first occurrence.
    pub fn filter_unseen(&self, incoming: Vec<Product>) -> Vec<Product> {
        let mut seen: HashSet<String> = self.products.iter().map(|p| p.code.clone()).collect();
        let mut unseen = Vec::with_capacity(incoming.len());
        for product in incoming {
            if seen.insert(product.code.clone()) {
                unseen.push(product);
            }
        }
        unseen
    }

    /// Append candidates after the existing entries and return the ones added.
    ///
    /// Codes are checked again against the current contents, so candidates
    /// filtered against an older view of the store cannot introduce duplicates.
    pub fn append_new(&mut self, candidates: Vec<Product>) -> Vec<Product> {
        let mut seen: HashSet<String> = self.products.iter().map(|p| p.code.clone()).collect();
        let mut added = Vec::new();
        for product in candidates {
            if seen.insert(product.code.clone()) {
                added.push(product);
            }
        }
        self.products.extend(added.iter().cloned());
        added
    }

    /// Put a product in front of the collection.
    ///
    /// Returns `false` and leaves the store as is when the code already exists.
    pub fn prepend(&mut self, product: Product) -> bool {
        if self.contains_code(&product.code) {
            return false;
        }
        self.products.insert(0, product);
        true
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}
